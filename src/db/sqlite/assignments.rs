use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{ScopeClause, ScopeColumns, parse_enum, parse_optional_uuid, parse_uuid};
use crate::{
    authz::Predicate,
    db::{
        error::{DbError, DbResult},
        repos::{AssignmentRepo, SortOrder},
    },
    models::{
        Assignment, AssignmentChanges, AssignmentStatus, GradeAssignment, NewAssignment,
    },
};

const SCOPE: ScopeColumns = ScopeColumns {
    owner: "student_id",
    grader: Some("teacher_id"),
    status: Some("status"),
};

const SELECT_ASSIGNMENT: &str = r#"
    SELECT a.id, a.title, a.description, a.file_path, a.file_type,
           a.student_id, s.full_name AS student_name,
           a.teacher_id, t.full_name AS teacher_name,
           a.score, a.comment, a.status, a.created_at, a.updated_at
    FROM assignments a
    JOIN users s ON s.id = a.student_id
    LEFT JOIN users t ON t.id = a.teacher_id
"#;

pub struct SqliteAssignmentRepo {
    pool: SqlitePool,
}

impl SqliteAssignmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn assignment_from_row(row: &SqliteRow) -> DbResult<Assignment> {
        Ok(Assignment {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            title: row.get("title"),
            description: row.get("description"),
            file_path: row.get("file_path"),
            file_type: row.get("file_type"),
            student_id: parse_uuid(&row.get::<String, _>("student_id"))?,
            student_name: row.get("student_name"),
            teacher_id: parse_optional_uuid(row.get("teacher_id"))?,
            teacher_name: row.get("teacher_name"),
            score: row.get("score"),
            comment: row.get("comment"),
            status: parse_enum(&row.get::<String, _>("status"))?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn fetch(&self, id: Uuid) -> DbResult<Assignment> {
        let query = format!("{} WHERE a.id = ?", SELECT_ASSIGNMENT);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)?;
        Self::assignment_from_row(&row)
    }
}

#[async_trait]
impl AssignmentRepo for SqliteAssignmentRepo {
    async fn create(&self, input: NewAssignment) -> DbResult<Assignment> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO assignments (
                id, title, description, file_path, file_type, student_id,
                teacher_id, score, comment, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, NULL, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.file.path)
        .bind(&input.file.media_type)
        .bind(input.student_id.to_string())
        .bind(AssignmentStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::Validation("Submitting student does not exist".to_string())
            }
            _ => DbError::from(e),
        })?;

        self.fetch(id).await
    }

    async fn get(&self, id: Uuid, scope: &Predicate) -> DbResult<Assignment> {
        let clause = ScopeClause::build(scope, &SCOPE, Some("a"))?;
        let query = format!("{} WHERE a.id = ?{}", SELECT_ASSIGNMENT, clause.sql);

        let mut q = sqlx::query(&query).bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let row = q.fetch_optional(&self.pool).await?.ok_or(DbError::NotFound)?;
        Self::assignment_from_row(&row)
    }

    async fn list(&self, scope: &Predicate, order: SortOrder) -> DbResult<Vec<Assignment>> {
        let clause = ScopeClause::build(scope, &SCOPE, Some("a"))?;
        let query = format!(
            "{} WHERE 1 = 1{} ORDER BY a.created_at {}, a.id {}",
            SELECT_ASSIGNMENT,
            clause.sql,
            order.as_sql(),
            order.as_sql()
        );

        let mut q = sqlx::query(&query);
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::assignment_from_row).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        scope: &Predicate,
        input: AssignmentChanges,
    ) -> DbResult<Assignment> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            r#"
            UPDATE assignments
            SET title = ?,
                description = ?,
                file_path = COALESCE(?, file_path),
                file_type = COALESCE(?, file_type),
                updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let (file_path, file_type) = match &input.file {
            Some(file) => (Some(file.path.as_str()), Some(file.media_type.as_str())),
            None => (None, None),
        };

        let mut q = sqlx::query(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(file_path)
            .bind(file_type)
            .bind(now)
            .bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let result = q.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.fetch(id).await
    }

    async fn grade(
        &self,
        id: Uuid,
        scope: &Predicate,
        grader: Uuid,
        input: GradeAssignment,
    ) -> DbResult<Assignment> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        // Claim and grade in one statement; the scope is checked at write time.
        let query = format!(
            r#"
            UPDATE assignments
            SET score = ?,
                comment = ?,
                teacher_id = ?,
                status = ?,
                updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(input.score)
            .bind(&input.comment)
            .bind(grader.to_string())
            .bind(AssignmentStatus::Graded.as_str())
            .bind(now)
            .bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let result = q.execute(&self.pool).await.map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                DbError::Validation("Score must be between 0 and 100".to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::Validation("Grading teacher does not exist".to_string())
            }
            _ => DbError::from(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.fetch(id).await
    }

    async fn delete(&self, id: Uuid, scope: &Predicate) -> DbResult<()> {
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!("DELETE FROM assignments WHERE id = ?{}", clause.sql);

        let mut q = sqlx::query(&query).bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let result = q.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM assignments")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}
