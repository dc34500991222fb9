//! HTTP surface of the JSON API, mounted under `/api`.

pub mod assignments;
pub mod auth;
pub mod error;
pub mod feedback;
mod extract;
mod form;
pub mod health;
pub mod materials;
pub mod users;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::{AppState, middleware};

/// Body of mutations that return nothing but a confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build the `/api` router.
///
/// Health probes and the unauthenticated account endpoints are public; every
/// other route requires a bearer token.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected = Router::new()
        .route("/auth/verify", get(auth::verify))
        .nest("/users", user_routes())
        .nest("/materials", material_routes())
        .nest("/assignments", assignment_routes())
        .nest("/feedback", feedback_routes())
        .route_layer(from_fn_with_state(state, middleware::auth_middleware));

    public.merge(protected)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/stats", get(users::stats))
        .route(
            "/profile",
            get(users::profile).put(users::update_profile),
        )
        .route("/profile/image", post(users::upload_profile_image))
        .route("/{id}", put(users::update).delete(users::delete))
}

fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(materials::list).post(materials::create))
        .route("/mine", get(materials::mine))
        .route("/video/youtube", post(materials::create_video_link))
        .route(
            "/{id}",
            get(materials::get)
                .put(materials::update)
                .delete(materials::delete),
        )
        .route("/{id}/video", post(materials::attach_video))
}

fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(assignments::list).post(assignments::submit))
        .route("/pending", get(assignments::pending))
        .route("/graded", get(assignments::graded))
        .route(
            "/{id}",
            get(assignments::get)
                .put(assignments::update)
                .delete(assignments::delete),
        )
        .route("/{id}/grade", put(assignments::grade))
}

fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(feedback::list).post(feedback::create))
        .route("/status/{status}", get(feedback::by_status))
        .route(
            "/{id}",
            get(feedback::get)
                .put(feedback::update)
                .delete(feedback::delete),
        )
        .route("/{id}/respond", put(feedback::respond))
}
