use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    authz::Predicate,
    db::error::DbResult,
    models::{NewUser, RoleCounts, UpdateProfile, User, UserChanges, UserCredentials},
};

/// Account persistence. The predicate's owner condition applies to the
/// account id itself.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert an account. Duplicate username or email is a `Conflict`.
    async fn create(&self, input: NewUser) -> DbResult<User>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>>;
    async fn get_scoped(&self, id: Uuid, scope: &Predicate) -> DbResult<User>;
    /// Look up an account and its password hash for login.
    async fn get_credentials(&self, username: &str) -> DbResult<Option<UserCredentials>>;
    async fn list(&self, scope: &Predicate) -> DbResult<Vec<User>>;
    async fn update(&self, id: Uuid, scope: &Predicate, input: UserChanges) -> DbResult<User>;
    async fn update_profile(
        &self,
        id: Uuid,
        scope: &Predicate,
        input: UpdateProfile,
    ) -> DbResult<User>;
    async fn set_profile_image(&self, id: Uuid, scope: &Predicate, path: &str) -> DbResult<User>;
    async fn delete(&self, id: Uuid, scope: &Predicate) -> DbResult<()>;
    /// Public paths of uploaded files on rows that deleting this account
    /// cascades away: material documents and videos, submitted assignments.
    async fn owned_file_paths(&self, id: Uuid) -> DbResult<Vec<String>>;
    async fn count_by_role(&self) -> DbResult<RoleCounts>;
}
