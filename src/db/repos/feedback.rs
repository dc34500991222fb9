use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    authz::Predicate,
    db::error::DbResult,
    models::{CreateFeedback, Feedback, UpdateFeedback},
};

/// Feedback persistence. The predicate's owner condition applies to `student_id`.
#[async_trait]
pub trait FeedbackRepo: Send + Sync {
    /// Insert an open feedback item owned by `student_id`.
    async fn create(&self, student_id: Uuid, input: CreateFeedback) -> DbResult<Feedback>;
    async fn get(&self, id: Uuid, scope: &Predicate) -> DbResult<Feedback>;
    async fn list(&self, scope: &Predicate) -> DbResult<Vec<Feedback>>;
    async fn update(&self, id: Uuid, scope: &Predicate, input: UpdateFeedback)
    -> DbResult<Feedback>;
    /// Store the admin response and close the item in one statement.
    async fn respond(&self, id: Uuid, scope: &Predicate, response: &str) -> DbResult<Feedback>;
    async fn delete(&self, id: Uuid, scope: &Predicate) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
}
