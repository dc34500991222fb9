//! Role-based learning management system.
//!
//! Students submit assignments and feedback, teachers publish materials and
//! grade submissions, administrators manage accounts. Everything is served
//! as a JSON API backed by SQLite, with uploaded files on local disk.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};

pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;

use crate::{
    auth::TokenIssuer,
    config::{ConfigError, LmsConfig},
    db::{DbError, DbPool},
    services::{FileStorageError, FilesystemFileStorage, ServiceError, Services},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LmsConfig>,
    pub db: Arc<DbPool>,
    pub services: Services,
}

/// Failures while assembling [`AppState`].
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Upload storage error: {0}")]
    Storage(#[from] FileStorageError),
    #[error("Failed to seed default accounts: {0}")]
    Seed(#[from] ServiceError),
}

impl AppState {
    /// Open the database, apply migrations and seed accounts as configured,
    /// then wire up the services.
    pub async fn new(config: LmsConfig) -> Result<Self, StartupError> {
        let tokens = TokenIssuer::from_config(&config.auth)?;

        let pool = DbPool::from_config(&config.database).await?;
        if config.database.run_migrations() {
            pool.run_migrations().await?;
        }
        let db = Arc::new(pool);

        let file_storage = FilesystemFileStorage::new(config.storage.uploads_dir.clone())?;
        tracing::info!(
            path = %file_storage.root().display(),
            prefix = %config.storage.public_prefix,
            "Upload storage ready"
        );

        let services = Services::new(db.clone(), Arc::new(file_storage), &config.storage, tokens);

        if config.auth.seed_default_accounts {
            let created = services.auth.seed_default_accounts().await?;
            if created > 0 {
                tracing::info!(created, "Seeded default accounts");
            }
        }

        Ok(Self {
            config: Arc::new(config),
            db,
            services,
        })
    }
}

/// Assemble the full application: `/api`, the uploads mount and the
/// cross-cutting layers.
pub fn build_app(config: &LmsConfig, state: AppState) -> Router {
    let uploads_mount = config.storage.public_prefix.trim_end_matches('/');

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .nest_service(uploads_mount, ServeDir::new(&config.storage.uploads_dir))
        .layer(from_fn(middleware::request_id_middleware));

    // Layers run in reverse order, so CORS sees requests before the request ID.
    if let Some(cors_layer) = config.server.cors.clone().into_layer() {
        app = app.layer(cors_layer);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}
