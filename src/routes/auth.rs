//! Registration, login and session endpoints under `/api/auth`.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{MessageResponse, error::ApiError, extract::ValidJson};
use crate::{
    AppState,
    auth::Identity,
    models::{RegisterUser, User},
};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: User,
}

/// Self-service registration. Always creates a student.
#[tracing::instrument(name = "auth.register", skip(state, input), fields(username = %input.username))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<RegisterUser>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state.services.auth.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Account created",
            user,
        }),
    ))
}

#[tracing::instrument(name = "auth.login", skip(state, input), fields(username = %input.username))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .services
        .auth
        .login(&input.username, &input.password)
        .await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        token: outcome.token,
        user: outcome.user,
    }))
}

/// Tokens are not tracked server-side; the client discards its token.
#[tracing::instrument(name = "auth.logout")]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logout successful"))
}

/// Confirm the token and return fresh account data.
#[tracing::instrument(name = "auth.verify", skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn verify(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let user = state.services.auth.verify(&identity).await?;
    Ok(Json(VerifyResponse { valid: true, user }))
}
