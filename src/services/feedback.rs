use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::ServiceResult;
use crate::{
    authz::{Actor, FeedbackAction, RowState, decide},
    db::DbPool,
    models::{CreateFeedback, Feedback, FeedbackStatus, RespondFeedback, UpdateFeedback},
};

#[derive(Clone)]
pub struct FeedbackService {
    db: Arc<DbPool>,
}

impl FeedbackService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn list(&self, actor: &Actor) -> ServiceResult<Vec<Feedback>> {
        let scope = decide(actor, FeedbackAction::Read)?;
        Ok(self.db.feedback().list(&scope).await?)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> ServiceResult<Feedback> {
        let scope = decide(actor, FeedbackAction::Read)?;
        Ok(self.db.feedback().get(id, &scope).await?)
    }

    pub async fn create(&self, actor: &Actor, input: CreateFeedback) -> ServiceResult<Feedback> {
        decide(actor, FeedbackAction::Create)?;
        input.validate()?;

        let feedback = self.db.feedback().create(actor.id, input).await?;
        tracing::info!(feedback_id = %feedback.id, "Feedback submitted");
        Ok(feedback)
    }

    /// Edit open feedback owned by the caller.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateFeedback,
    ) -> ServiceResult<Feedback> {
        let scope = decide(actor, FeedbackAction::Update)?;
        input.validate()?;
        Ok(self.db.feedback().update(id, &scope, input).await?)
    }

    /// Record the admin response. Responding always closes the item.
    pub async fn respond(
        &self,
        actor: &Actor,
        id: Uuid,
        input: RespondFeedback,
    ) -> ServiceResult<Feedback> {
        let scope = decide(actor, FeedbackAction::Respond)?;
        input.validate()?;

        let feedback = self
            .db
            .feedback()
            .respond(id, &scope, &input.response)
            .await?;
        tracing::info!(feedback_id = %id, "Feedback answered and closed");
        Ok(feedback)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let scope = decide(actor, FeedbackAction::Delete)?;
        Ok(self.db.feedback().delete(id, &scope).await?)
    }

    pub async fn list_by_status(
        &self,
        actor: &Actor,
        status: FeedbackStatus,
    ) -> ServiceResult<Vec<Feedback>> {
        let scope = decide(actor, FeedbackAction::ListByStatus)?.in_state(RowState::Feedback(status));
        Ok(self.db.feedback().list(&scope).await?)
    }
}
