use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::error::ErrorResponse;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on a protected route
    #[error("Authentication credentials required")]
    MissingCredentials,

    /// Wrong username or password (deliberately not distinguished)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Token is malformed, badly signed or carries unusable claims
    #[error("Invalid authentication token")]
    InvalidToken,

    /// Token signature is valid but it has expired
    #[error("Authentication token has expired")]
    ExpiredToken,

    /// Internal error during authentication
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Machine-readable code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidToken => "invalid_token",
            AuthError::ExpiredToken => "expired_token",
            AuthError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::Internal(detail) => {
                tracing::error!(error = %detail, "Authentication failed internally");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(self.code(), message);
        (self.status(), Json(body)).into_response()
    }
}
