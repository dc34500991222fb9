use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{ScopeClause, ScopeColumns, map_unique_violation, parse_enum, parse_uuid};
use crate::{
    authz::Predicate,
    db::{
        error::{DbError, DbResult},
        repos::UserRepo,
    },
    models::{NewUser, Role, RoleCounts, UpdateProfile, User, UserChanges, UserCredentials},
};

const SCOPE: ScopeColumns = ScopeColumns {
    owner: "id",
    grader: None,
    status: None,
};

const USER_COLUMNS: &str =
    "id, username, email, full_name, role, profile_image, created_at, updated_at";

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &SqliteRow) -> DbResult<User> {
        Ok(User {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            username: row.get("username"),
            email: row.get("email"),
            full_name: row.get("full_name"),
            role: parse_enum(&row.get::<String, _>("role"))?,
            profile_image: row.get("profile_image"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

/// Name the column behind a `UNIQUE constraint failed: users.<col>` message.
fn duplicate_account_message(db_message: &str) -> String {
    if db_message.contains("users.username") {
        "Username is already taken".to_string()
    } else if db_message.contains("users.email") {
        "Email is already used by another account".to_string()
    } else {
        "Username or email is already in use".to_string()
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn create(&self, input: NewUser) -> DbResult<User> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.full_name)
        .bind(input.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, duplicate_account_message))?;

        Ok(User {
            id,
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            role: input.role,
            profile_image: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn get_scoped(&self, id: Uuid, scope: &Predicate) -> DbResult<User> {
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            "SELECT {} FROM users WHERE id = ?{}",
            USER_COLUMNS, clause.sql
        );

        let mut q = sqlx::query(&query).bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let row = q.fetch_optional(&self.pool).await?.ok_or(DbError::NotFound)?;
        Self::user_from_row(&row)
    }

    async fn get_credentials(&self, username: &str) -> DbResult<Option<UserCredentials>> {
        let query = format!(
            "SELECT {}, password_hash FROM users WHERE username = ?",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(UserCredentials {
                user: Self::user_from_row(&row)?,
                password_hash: row.get("password_hash"),
            })),
            None => Ok(None),
        }
    }

    async fn list(&self, scope: &Predicate) -> DbResult<Vec<User>> {
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            "SELECT {} FROM users WHERE 1 = 1{} ORDER BY created_at DESC, id DESC",
            USER_COLUMNS, clause.sql
        );

        let mut q = sqlx::query(&query);
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::user_from_row).collect()
    }

    async fn update(&self, id: Uuid, scope: &Predicate, input: UserChanges) -> DbResult<User> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            r#"
            UPDATE users
            SET username = ?,
                email = ?,
                full_name = ?,
                role = ?,
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(input.role.as_str())
            .bind(&input.password_hash)
            .bind(now)
            .bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let result = q
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, duplicate_account_message))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        scope: &Predicate,
        input: UpdateProfile,
    ) -> DbResult<User> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            r#"
            UPDATE users
            SET full_name = ?, email = ?, updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(now)
            .bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let result = q
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, duplicate_account_message))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn set_profile_image(&self, id: Uuid, scope: &Predicate, path: &str) -> DbResult<User> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            "UPDATE users SET profile_image = ?, updated_at = ? WHERE id = ?{}",
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(path)
            .bind(now)
            .bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let result = q.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid, scope: &Predicate) -> DbResult<()> {
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!("DELETE FROM users WHERE id = ?{}", clause.sql);

        let mut q = sqlx::query(&query).bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let result = q.execute(&self.pool).await.map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::Conflict(
                    "User has graded assignments and cannot be deleted".to_string(),
                )
            }
            _ => DbError::from(e),
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn owned_file_paths(&self, id: Uuid) -> DbResult<Vec<String>> {
        let paths: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT file_path FROM materials
            WHERE teacher_id = ? AND file_path IS NOT NULL
            UNION ALL
            SELECT video_url FROM materials
            WHERE teacher_id = ? AND video_type = 'upload'
            UNION ALL
            SELECT file_path FROM assignments WHERE student_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(id.to_string())
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(paths)
    }

    async fn count_by_role(&self) -> DbResult<RoleCounts> {
        let rows = sqlx::query("SELECT role, COUNT(*) AS count FROM users GROUP BY role")
            .fetch_all(&self.pool)
            .await?;

        let mut counts = RoleCounts::default();
        for row in rows {
            let count: i64 = row.get("count");
            match parse_enum::<Role>(&row.get::<String, _>("role"))? {
                Role::Student => counts.student = count,
                Role::Teacher => counts.teacher = count,
                Role::Admin => counts.admin = count,
            }
            counts.total += count;
        }

        Ok(counts)
    }
}
