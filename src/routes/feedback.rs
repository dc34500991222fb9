//! Student feedback endpoints under `/api/feedback`.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Serialize;
use uuid::Uuid;

use super::{
    MessageResponse,
    error::ApiError,
    extract::{ApiPath, ValidJson},
};
use crate::{
    AppState,
    auth::Identity,
    models::{CreateFeedback, Feedback, FeedbackStatus, RespondFeedback, UpdateFeedback},
};

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: &'static str,
    pub feedback: Feedback,
}

#[tracing::instrument(name = "feedback.list", skip(state, identity))]
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let items = state.services.feedback.list(&identity.actor()).await?;
    Ok(Json(items))
}

#[tracing::instrument(name = "feedback.get", skip(state, identity), fields(%feedback_id))]
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(feedback_id): ApiPath<Uuid>,
) -> Result<Json<Feedback>, ApiError> {
    let item = state
        .services
        .feedback
        .get(&identity.actor(), feedback_id)
        .await?;
    Ok(Json(item))
}

#[tracing::instrument(name = "feedback.create", skip(state, identity, input))]
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidJson(input): ValidJson<CreateFeedback>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let feedback = state
        .services
        .feedback
        .create(&identity.actor(), input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            message: "Feedback submitted",
            feedback,
        }),
    ))
}

#[tracing::instrument(name = "feedback.respond", skip(state, identity, input), fields(%feedback_id))]
pub async fn respond(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(feedback_id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<RespondFeedback>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let feedback = state
        .services
        .feedback
        .respond(&identity.actor(), feedback_id, input)
        .await?;
    Ok(Json(FeedbackResponse {
        message: "Response saved",
        feedback,
    }))
}

#[tracing::instrument(name = "feedback.update", skip(state, identity, input), fields(%feedback_id))]
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(feedback_id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateFeedback>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let feedback = state
        .services
        .feedback
        .update(&identity.actor(), feedback_id, input)
        .await?;
    Ok(Json(FeedbackResponse {
        message: "Feedback updated",
        feedback,
    }))
}

#[tracing::instrument(name = "feedback.delete", skip(state, identity), fields(%feedback_id))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(feedback_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .services
        .feedback
        .delete(&identity.actor(), feedback_id)
        .await?;
    Ok(Json(MessageResponse::new("Feedback deleted")))
}

/// `GET /status/{status}` where status is `open` or `closed`.
#[tracing::instrument(name = "feedback.by_status", skip(state, identity), fields(%status))]
pub async fn by_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(status): ApiPath<String>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let status: FeedbackStatus = status
        .parse()
        .map_err(|e: String| ApiError::bad_request("validation_error", e))?;
    let items = state
        .services
        .feedback
        .list_by_status(&identity.actor(), status)
        .await?;
    Ok(Json(items))
}
