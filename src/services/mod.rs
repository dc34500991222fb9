mod assignments;
mod auth;
mod error;
mod feedback;
mod file_storage;
mod materials;
mod uploads;
mod users;


use std::sync::Arc;

pub use assignments::AssignmentService;
pub use auth::{AuthService, LoginOutcome};
pub use error::{ServiceError, ServiceResult};
pub use feedback::FeedbackService;
pub use file_storage::{FileStorage, FileStorageError, FileStorageResult, FilesystemFileStorage};
pub use materials::{MaterialService, VideoSource};
pub use uploads::{IncomingFile, UploadError, UploadKind, UploadPolicy, Uploads, stored_file_name};
pub use users::UserService;

use crate::{
    auth::{AuthError, TokenIssuer, password},
    config::StorageConfig,
    db::DbPool,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub materials: MaterialService,
    pub assignments: AssignmentService,
    pub feedback: FeedbackService,
    pub uploads: Uploads,
}

impl Services {
    pub fn new(
        db: Arc<DbPool>,
        file_storage: Arc<dyn FileStorage>,
        storage_config: &StorageConfig,
        tokens: TokenIssuer,
    ) -> Self {
        let uploads = Uploads::new(file_storage, storage_config);
        Self {
            auth: AuthService::new(db.clone(), tokens),
            users: UserService::new(db.clone(), uploads.clone()),
            materials: MaterialService::new(db.clone(), uploads.clone()),
            assignments: AssignmentService::new(db.clone(), uploads.clone()),
            feedback: FeedbackService::new(db),
            uploads,
        }
    }
}

/// Hash a password on the blocking thread pool.
pub(crate) async fn hash_in_background(password: String) -> ServiceResult<String> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))??;
    Ok(hash)
}
