use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    authz::Predicate,
    db::error::DbResult,
    models::{Material, MaterialVideo, NewMaterial, UpdateMaterial},
};

/// Material persistence. The predicate's owner condition applies to `teacher_id`.
#[async_trait]
pub trait MaterialRepo: Send + Sync {
    async fn create(&self, input: NewMaterial) -> DbResult<Material>;
    async fn get(&self, id: Uuid, scope: &Predicate) -> DbResult<Material>;
    async fn list(&self, scope: &Predicate) -> DbResult<Vec<Material>>;
    async fn update(&self, id: Uuid, scope: &Predicate, input: UpdateMaterial)
    -> DbResult<Material>;
    /// Replace the material's video, whatever kind it was before.
    async fn set_video(
        &self,
        id: Uuid,
        scope: &Predicate,
        video: MaterialVideo,
    ) -> DbResult<Material>;
    async fn delete(&self, id: Uuid, scope: &Predicate) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
}
