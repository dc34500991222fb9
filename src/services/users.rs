use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{IncomingFile, ServiceError, ServiceResult, UploadKind, Uploads, hash_in_background};
use crate::{
    authz::{Actor, UserAction, decide},
    db::DbPool,
    models::{
        CreateUser, NewUser, SystemStats, UpdateProfile, UpdateUser, User, UserChanges,
    },
};

/// Account administration and self-service profile operations.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    uploads: Uploads,
}

impl UserService {
    pub fn new(db: Arc<DbPool>, uploads: Uploads) -> Self {
        Self { db, uploads }
    }

    /// List every account (admin only).
    pub async fn list(&self, actor: &Actor) -> ServiceResult<Vec<User>> {
        let scope = decide(actor, UserAction::List)?;
        Ok(self.db.users().list(&scope).await?)
    }

    /// Dashboard totals (admin only).
    pub async fn stats(&self, actor: &Actor) -> ServiceResult<SystemStats> {
        decide(actor, UserAction::Stats)?;

        Ok(SystemStats {
            users: self.db.users().count_by_role().await?,
            materials: self.db.materials().count().await?,
            assignments: self.db.assignments().count().await?,
            feedback: self.db.feedback().count().await?,
        })
    }

    /// Create an account with any role (admin only).
    pub async fn create(&self, actor: &Actor, input: CreateUser) -> ServiceResult<User> {
        decide(actor, UserAction::Create)?;
        input.validate()?;

        let password_hash = hash_in_background(input.password).await?;
        let user = self
            .db
            .users()
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                full_name: input.full_name,
                role: input.role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created by admin");
        Ok(user)
    }

    /// Edit any account (admin only). The password changes only when supplied.
    pub async fn update(&self, actor: &Actor, id: Uuid, input: UpdateUser) -> ServiceResult<User> {
        let scope = decide(actor, UserAction::Update)?;
        input.validate()?;

        let password_hash = match input.password {
            Some(password) => Some(hash_in_background(password).await?),
            None => None,
        };

        let user = self
            .db
            .users()
            .update(
                id,
                &scope,
                UserChanges {
                    username: input.username,
                    email: input.email,
                    full_name: input.full_name,
                    role: input.role,
                    password_hash,
                },
            )
            .await?;
        Ok(user)
    }

    /// Delete an account (admin only). Nobody can delete themselves.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let scope = decide(actor, UserAction::Delete)?;
        if id == actor.id {
            return Err(ServiceError::Rule(
                "You cannot delete your own account".to_string(),
            ));
        }

        let existing = self.db.users().get_scoped(id, &scope).await?;
        let owned_files = self.db.users().owned_file_paths(id).await?;
        self.db.users().delete(id, &scope).await?;

        for path in existing.profile_image.iter().chain(owned_files.iter()) {
            self.uploads.discard(path).await;
        }
        tracing::info!(user_id = %id, "Account deleted");
        Ok(())
    }

    /// The caller's own account.
    pub async fn profile(&self, actor: &Actor) -> ServiceResult<User> {
        let scope = decide(actor, UserAction::ReadProfile)?;
        Ok(self.db.users().get_scoped(actor.id, &scope).await?)
    }

    /// Edit the caller's own name and email.
    pub async fn update_profile(&self, actor: &Actor, input: UpdateProfile) -> ServiceResult<User> {
        let scope = decide(actor, UserAction::UpdateProfile)?;
        input.validate()?;
        Ok(self
            .db
            .users()
            .update_profile(actor.id, &scope, input)
            .await?)
    }

    /// Replace the caller's profile image.
    pub async fn set_profile_image(
        &self,
        actor: &Actor,
        file: Option<IncomingFile>,
    ) -> ServiceResult<User> {
        let scope = decide(actor, UserAction::UpdateProfile)?;
        let previous = self.db.users().get_scoped(actor.id, &scope).await?;

        let image = self
            .uploads
            .accept_required(UploadKind::ProfileImage, file)
            .await?;

        let user = match self
            .db
            .users()
            .set_profile_image(actor.id, &scope, &image.path)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                self.uploads.discard(&image.path).await;
                return Err(e.into());
            }
        };

        if let Some(old) = previous.profile_image.as_deref() {
            self.uploads.discard(old).await;
        }
        Ok(user)
    }
}
