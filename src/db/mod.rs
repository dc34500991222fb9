mod error;
pub mod repos;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    users: Arc<dyn UserRepo>,
    materials: Arc<dyn MaterialRepo>,
    assignments: Arc<dyn AssignmentRepo>,
    feedback: Arc<dyn FeedbackRepo>,
}

impl CachedRepos {
    fn sqlite(pool: &sqlx::SqlitePool) -> Self {
        Self {
            users: Arc::new(sqlite::SqliteUserRepo::new(pool.clone())),
            materials: Arc::new(sqlite::SqliteMaterialRepo::new(pool.clone())),
            assignments: Arc::new(sqlite::SqliteAssignmentRepo::new(pool.clone())),
            feedback: Arc::new(sqlite::SqliteFeedbackRepo::new(pool.clone())),
        }
    }
}

/// Database pool and the repositories built on it.
///
/// Constructed explicitly at startup and handed to services; there is no
/// process-wide connection. Repositories are cached at construction time to
/// avoid allocation on each access.
pub struct DbPool {
    pool: sqlx::SqlitePool,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos::sqlite(&pool);
        DbPool { pool, repos }
    }

    /// Open the configured database.
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .create_if_missing(cfg.create_if_missing)
                            .foreign_keys(true)
                            .journal_mode(if cfg.wal_mode {
                                sqlx::sqlite::SqliteJournalMode::Wal
                            } else {
                                sqlx::sqlite::SqliteJournalMode::Delete
                            })
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;

                tracing::info!(path = %cfg.path, "Opened SQLite database");
                Ok(Self::from_sqlite(pool))
            }
        }
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.pool)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    /// Get user repository
    pub fn users(&self) -> Arc<dyn UserRepo> {
        Arc::clone(&self.repos.users)
    }

    /// Get material repository
    pub fn materials(&self) -> Arc<dyn MaterialRepo> {
        Arc::clone(&self.repos.materials)
    }

    /// Get assignment repository
    pub fn assignments(&self) -> Arc<dyn AssignmentRepo> {
        Arc::clone(&self.repos.assignments)
    }

    /// Get feedback repository
    pub fn feedback(&self) -> Arc<dyn FeedbackRepo> {
        Arc::clone(&self.repos.feedback)
    }

    /// Check that the database answers a trivial query.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close all pooled connections. Called once during shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
