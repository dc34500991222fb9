use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{ScopeClause, ScopeColumns, parse_enum, parse_uuid};
use crate::{
    authz::Predicate,
    db::{
        error::{DbError, DbResult},
        repos::FeedbackRepo,
    },
    models::{CreateFeedback, Feedback, FeedbackStatus, UpdateFeedback},
};

const SCOPE: ScopeColumns = ScopeColumns {
    owner: "student_id",
    grader: None,
    status: Some("status"),
};

const SELECT_FEEDBACK: &str = r#"
    SELECT f.id, f.subject, f.message, f.student_id, s.full_name AS student_name,
           f.status, f.admin_response, f.created_at, f.updated_at
    FROM feedback f
    JOIN users s ON s.id = f.student_id
"#;

pub struct SqliteFeedbackRepo {
    pool: SqlitePool,
}

impl SqliteFeedbackRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn feedback_from_row(row: &SqliteRow) -> DbResult<Feedback> {
        Ok(Feedback {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            subject: row.get("subject"),
            message: row.get("message"),
            student_id: parse_uuid(&row.get::<String, _>("student_id"))?,
            student_name: row.get("student_name"),
            status: parse_enum(&row.get::<String, _>("status"))?,
            admin_response: row.get("admin_response"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn fetch(&self, id: Uuid) -> DbResult<Feedback> {
        let query = format!("{} WHERE f.id = ?", SELECT_FEEDBACK);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)?;
        Self::feedback_from_row(&row)
    }
}

#[async_trait]
impl FeedbackRepo for SqliteFeedbackRepo {
    async fn create(&self, student_id: Uuid, input: CreateFeedback) -> DbResult<Feedback> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO feedback (id, subject, message, student_id, status, admin_response, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.subject)
        .bind(&input.message)
        .bind(student_id.to_string())
        .bind(FeedbackStatus::Open.as_str())
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

    async fn get(&self, id: Uuid, scope: &Predicate) -> DbResult<Feedback> {
        let clause = ScopeClause::build(scope, &SCOPE, Some("f"))?;
        let query = format!("{} WHERE f.id = ?{}", SELECT_FEEDBACK, clause.sql);

        let mut q = sqlx::query(&query).bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let row = q.fetch_optional(&self.pool).await?.ok_or(DbError::NotFound)?;
        Self::feedback_from_row(&row)
    }

    async fn list(&self, scope: &Predicate) -> DbResult<Vec<Feedback>> {
        let clause = ScopeClause::build(scope, &SCOPE, Some("f"))?;
        let query = format!(
            "{} WHERE 1 = 1{} ORDER BY f.created_at DESC, f.id DESC",
            SELECT_FEEDBACK, clause.sql
        );

        let mut q = sqlx::query(&query);
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::feedback_from_row).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        scope: &Predicate,
        input: UpdateFeedback,
    ) -> DbResult<Feedback> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            r#"
            UPDATE feedback
            SET subject = ?, message = ?, updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(&input.subject)
            .bind(&input.message)
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

    async fn respond(&self, id: Uuid, scope: &Predicate, response: &str) -> DbResult<Feedback> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            r#"
            UPDATE feedback
            SET admin_response = ?, status = ?, updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(response)
            .bind(FeedbackStatus::Closed.as_str())
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

    async fn delete(&self, id: Uuid, scope: &Predicate) -> DbResult<()> {
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!("DELETE FROM feedback WHERE id = ?{}", clause.sql);

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
        let row = sqlx::query("SELECT COUNT(*) AS count FROM feedback")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}
