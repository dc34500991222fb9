//! Bearer-token authentication for protected routes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::RequestId;
use crate::{AppState, auth::AuthError};

/// Validate the bearer token and insert the caller's
/// [`Identity`](crate::auth::Identity) into the request extensions.
///
/// Missing, malformed and expired tokens are rejected with 401 before the
/// handler runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.as_str().to_string());

    let token = bearer_token(req.headers()).ok_or(AuthError::MissingCredentials)?;
    let identity = match state.services.auth.authenticate(token) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(request_id = ?request_id, error = %e, "Rejected bearer token");
            return Err(e);
        }
    };

    tracing::debug!(
        request_id = ?request_id,
        user_id = %identity.user_id,
        role = %identity.role,
        "Request authenticated"
    );

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Extract the token from `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
