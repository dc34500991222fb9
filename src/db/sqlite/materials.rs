use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{ScopeClause, ScopeColumns, parse_enum, parse_uuid};
use crate::{
    authz::Predicate,
    db::{
        error::{DbError, DbResult},
        repos::MaterialRepo,
    },
    models::{Material, MaterialVideo, NewMaterial, UpdateMaterial, VideoKind},
};

const SCOPE: ScopeColumns = ScopeColumns {
    owner: "teacher_id",
    grader: None,
    status: None,
};

const SELECT_MATERIAL: &str = r#"
    SELECT m.id, m.title, m.description, m.file_path, m.file_type,
           m.video_url, m.video_type, m.teacher_id, u.full_name AS teacher_name,
           m.created_at, m.updated_at
    FROM materials m
    JOIN users u ON u.id = m.teacher_id
"#;

pub struct SqliteMaterialRepo {
    pool: SqlitePool,
}

impl SqliteMaterialRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn material_from_row(row: &SqliteRow) -> DbResult<Material> {
        let video_type: Option<String> = row.get("video_type");
        Ok(Material {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            title: row.get("title"),
            description: row.get("description"),
            file_path: row.get("file_path"),
            file_type: row.get("file_type"),
            video_url: row.get("video_url"),
            video_type: video_type.as_deref().map(parse_enum::<VideoKind>).transpose()?,
            teacher_id: parse_uuid(&row.get::<String, _>("teacher_id"))?,
            teacher_name: row.get("teacher_name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Fetch a material without any scope. Only used to read back a row this
    /// repository has just written under the caller's scope.
    async fn fetch(&self, id: Uuid) -> DbResult<Material> {
        let query = format!("{} WHERE m.id = ?", SELECT_MATERIAL);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)?;
        Self::material_from_row(&row)
    }
}

#[async_trait]
impl MaterialRepo for SqliteMaterialRepo {
    async fn create(&self, input: NewMaterial) -> DbResult<Material> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let (file_path, file_type) = match &input.document {
            Some(doc) => (Some(doc.path.as_str()), Some(doc.media_type.as_str())),
            None => (None, None),
        };
        let (video_url, video_type) = match &input.video {
            Some(video) => (Some(video.url.as_str()), Some(video.kind.as_str())),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO materials (
                id, title, description, file_path, file_type,
                video_url, video_type, teacher_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(&input.description)
        .bind(file_path)
        .bind(file_type)
        .bind(video_url)
        .bind(video_type)
        .bind(input.teacher_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::Validation("Owning teacher does not exist".to_string())
            }
            _ => DbError::from(e),
        })?;

        self.fetch(id).await
    }

    async fn get(&self, id: Uuid, scope: &Predicate) -> DbResult<Material> {
        let clause = ScopeClause::build(scope, &SCOPE, Some("m"))?;
        let query = format!("{} WHERE m.id = ?{}", SELECT_MATERIAL, clause.sql);

        let mut q = sqlx::query(&query).bind(id.to_string());
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let row = q.fetch_optional(&self.pool).await?.ok_or(DbError::NotFound)?;
        Self::material_from_row(&row)
    }

    async fn list(&self, scope: &Predicate) -> DbResult<Vec<Material>> {
        let clause = ScopeClause::build(scope, &SCOPE, Some("m"))?;
        let query = format!(
            "{} WHERE 1 = 1{} ORDER BY m.created_at DESC, m.id DESC",
            SELECT_MATERIAL, clause.sql
        );

        let mut q = sqlx::query(&query);
        for value in &clause.binds {
            q = q.bind(value.as_str());
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::material_from_row).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        scope: &Predicate,
        input: UpdateMaterial,
    ) -> DbResult<Material> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            r#"
            UPDATE materials
            SET title = ?, description = ?, updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(&input.title)
            .bind(&input.description)
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

    async fn set_video(
        &self,
        id: Uuid,
        scope: &Predicate,
        video: MaterialVideo,
    ) -> DbResult<Material> {
        let now = chrono::Utc::now();
        let clause = ScopeClause::build(scope, &SCOPE, None)?;
        let query = format!(
            r#"
            UPDATE materials
            SET video_url = ?, video_type = ?, updated_at = ?
            WHERE id = ?{}
            "#,
            clause.sql
        );

        let mut q = sqlx::query(&query)
            .bind(&video.url)
            .bind(video.kind.as_str())
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
        let query = format!("DELETE FROM materials WHERE id = ?{}", clause.sql);

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
        let row = sqlx::query("SELECT COUNT(*) AS count FROM materials")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}
