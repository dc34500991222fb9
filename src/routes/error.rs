//! Request-boundary error type.
//!
//! Every handler returns `Result<_, ApiError>`. Lower layers keep their own
//! error enums; the `From` impls here decide the status code, the
//! machine-readable code and what message the client sees.

use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::{
    auth::AuthError,
    authz::AuthzError,
    db::DbError,
    services::{ServiceError, UploadError},
};

/// JSON error body: `{"error": {"code": "...", "message": "..."}}`.
///
/// The request-id middleware adds `error.request_id` on the way out.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorInfo {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Error response for API requests.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// Log the detail and answer with a generic message.
    fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An internal error occurred",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => Self::new(StatusCode::NOT_FOUND, "not_found", "Resource not found"),
            DbError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "conflict", msg),
            DbError::Validation(msg) => Self::bad_request("validation_error", msg),
            DbError::Sqlx(_) | DbError::Migration(_) | DbError::Internal(_) => {
                tracing::error!(error = %err, "Database error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "An internal database error occurred",
                )
            }
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::AccessDenied(msg) => Self::new(StatusCode::FORBIDDEN, "forbidden", msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(detail) => Self::internal(detail),
            other => Self::new(other.status(), other.code(), other.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedType(_) => {
                Self::bad_request("unsupported_file_type", err.to_string())
            }
            UploadError::TooLarge { .. } => Self::bad_request("file_too_large", err.to_string()),
            UploadError::Missing(_) => Self::bad_request("missing_file", err.to_string()),
            UploadError::Storage(e) => Self::internal(e),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        Self::bad_request("validation_error", describe_validation(&err))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request("invalid_multipart", format!("Failed to read form data: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        Self::bad_request("validation_error", err.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        Self::bad_request("validation_error", err.body_text())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Db(e) => e.into(),
            ServiceError::Forbidden(e) => e.into(),
            ServiceError::Auth(e) => e.into(),
            ServiceError::Upload(e) => e.into(),
            ServiceError::InvalidInput(e) => e.into(),
            ServiceError::Rule(msg) => Self::bad_request("validation_error", msg),
        }
    }
}

/// Flatten validator output into one line, e.g.
/// `score: must be between 0 and 100; title: length`.
fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let parts: Vec<String> = fields
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();

    if parts.is_empty() {
        "Invalid input".to_string()
    } else {
        parts.join("; ")
    }
}
