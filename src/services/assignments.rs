use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{IncomingFile, ServiceResult, UploadKind, Uploads};
use crate::{
    authz::{Actor, AssignmentAction, decide},
    db::{DbPool, SortOrder},
    models::{
        Assignment, AssignmentChanges, GradeAssignment, NewAssignment, SubmitAssignment,
        UpdateAssignment,
    },
};

/// Submission, review and grading of assignments.
#[derive(Clone)]
pub struct AssignmentService {
    db: Arc<DbPool>,
    uploads: Uploads,
}

impl AssignmentService {
    pub fn new(db: Arc<DbPool>, uploads: Uploads) -> Self {
        Self { db, uploads }
    }

    /// Students see their own submissions, teachers see unclaimed ones and
    /// their own, admins see everything. Newest first.
    pub async fn list(&self, actor: &Actor) -> ServiceResult<Vec<Assignment>> {
        let scope = decide(actor, AssignmentAction::Read)?;
        Ok(self.db.assignments().list(&scope, SortOrder::Desc).await?)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> ServiceResult<Assignment> {
        let scope = decide(actor, AssignmentAction::Read)?;
        Ok(self.db.assignments().get(id, &scope).await?)
    }

    /// Submit work. The file is required and is stored before the row exists.
    pub async fn submit(
        &self,
        actor: &Actor,
        input: SubmitAssignment,
        file: Option<IncomingFile>,
    ) -> ServiceResult<Assignment> {
        decide(actor, AssignmentAction::Create)?;
        input.validate()?;

        let file = self
            .uploads
            .accept_required(UploadKind::AssignmentDocument, file)
            .await?;

        let result = self
            .db
            .assignments()
            .create(NewAssignment {
                title: input.title,
                description: input.description,
                file: file.clone(),
                student_id: actor.id,
            })
            .await;

        match result {
            Ok(assignment) => {
                tracing::info!(assignment_id = %assignment.id, "Assignment submitted");
                Ok(assignment)
            }
            Err(e) => {
                self.uploads.discard(&file.path).await;
                Err(e.into())
            }
        }
    }

    /// Grade a submission, claiming it for the caller if it is unclaimed.
    pub async fn grade(
        &self,
        actor: &Actor,
        id: Uuid,
        input: GradeAssignment,
    ) -> ServiceResult<Assignment> {
        let scope = decide(actor, AssignmentAction::Grade)?;
        input.validate()?;

        let assignment = self
            .db
            .assignments()
            .grade(id, &scope, actor.id, input)
            .await?;

        tracing::info!(
            assignment_id = %id,
            grader_id = %actor.id,
            score = ?assignment.score,
            "Assignment graded"
        );
        Ok(assignment)
    }

    /// Edit a pending submission, optionally replacing its file.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateAssignment,
        file: Option<IncomingFile>,
    ) -> ServiceResult<Assignment> {
        let scope = decide(actor, AssignmentAction::Update)?;
        input.validate()?;

        let existing = self.db.assignments().get(id, &scope).await?;
        let replacement = self
            .uploads
            .accept_optional(UploadKind::AssignmentDocument, file)
            .await?;

        let result = self
            .db
            .assignments()
            .update(
                id,
                &scope,
                AssignmentChanges {
                    title: input.title,
                    description: input.description,
                    file: replacement.clone(),
                },
            )
            .await;

        match result {
            Ok(assignment) => {
                if replacement.is_some() {
                    self.uploads.discard(&existing.file_path).await;
                }
                Ok(assignment)
            }
            Err(e) => {
                self.uploads.discard_ref(replacement.as_ref()).await;
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let scope = decide(actor, AssignmentAction::Delete)?;
        let existing = self.db.assignments().get(id, &scope).await?;
        self.db.assignments().delete(id, &scope).await?;

        self.uploads.discard(&existing.file_path).await;
        tracing::info!(assignment_id = %id, "Assignment deleted");
        Ok(())
    }

    /// The grading queue, oldest first.
    pub async fn pending(&self, actor: &Actor) -> ServiceResult<Vec<Assignment>> {
        let scope = decide(actor, AssignmentAction::ListPending)?;
        Ok(self.db.assignments().list(&scope, SortOrder::Asc).await?)
    }

    /// Graded work: the caller's own grading for teachers, all for admins.
    pub async fn graded(&self, actor: &Actor) -> ServiceResult<Vec<Assignment>> {
        let scope = decide(actor, AssignmentAction::ListGraded)?;
        Ok(self.db.assignments().list(&scope, SortOrder::Desc).await?)
    }
}
