use async_trait::async_trait;
use uuid::Uuid;

use super::SortOrder;
use crate::{
    authz::Predicate,
    db::error::DbResult,
    models::{Assignment, AssignmentChanges, GradeAssignment, NewAssignment},
};

/// Assignment persistence.
///
/// The predicate's owner condition applies to `student_id`; the claim and
/// graded-by conditions apply to `teacher_id`.
#[async_trait]
pub trait AssignmentRepo: Send + Sync {
    /// Insert a pending, unclaimed submission.
    async fn create(&self, input: NewAssignment) -> DbResult<Assignment>;
    async fn get(&self, id: Uuid, scope: &Predicate) -> DbResult<Assignment>;
    async fn list(&self, scope: &Predicate, order: SortOrder) -> DbResult<Vec<Assignment>>;
    async fn update(
        &self,
        id: Uuid,
        scope: &Predicate,
        input: AssignmentChanges,
    ) -> DbResult<Assignment>;
    /// Claim and grade in one conditional statement.
    ///
    /// Sets score, comment, `teacher_id = grader` and `status = graded`
    /// together, only if the row still satisfies `scope` at write time.
    async fn grade(
        &self,
        id: Uuid,
        scope: &Predicate,
        grader: Uuid,
        input: GradeAssignment,
    ) -> DbResult<Assignment>;
    async fn delete(&self, id: Uuid, scope: &Predicate) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
}
