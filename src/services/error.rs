use thiserror::Error;

use super::UploadError;
use crate::{auth::AuthError, authz::AuthzError, db::DbError};

/// Errors surfaced by the service layer. Each variant wraps the error of the
/// layer that produced it; the request boundary maps them to responses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    InvalidInput(#[from] validator::ValidationErrors),

    /// A business rule rejected otherwise well-formed input.
    #[error("{0}")]
    Rule(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
