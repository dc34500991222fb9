//! Liveness and readiness endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
}

/// Static liveness payload. Never touches the database.
#[tracing::instrument(name = "health.liveness")]
pub async fn liveness() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        message: "LMS API is running!",
    })
}

#[derive(Debug, Serialize)]
pub struct ReadinessStatus {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

/// Readiness probe. Returns 503 when the database does not answer.
#[tracing::instrument(name = "health.readiness", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let (code, status) = if database {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(ReadinessStatus {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
