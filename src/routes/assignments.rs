//! Assignment submission and grading endpoints under `/api/assignments`.

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use super::{
    MessageResponse,
    error::ApiError,
    extract::{ApiPath, ValidJson},
    form::FormData,
};
use crate::{
    AppState,
    auth::Identity,
    models::{Assignment, GradeAssignment, SubmitAssignment, UpdateAssignment},
};

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub message: &'static str,
    pub assignment: Assignment,
}

#[tracing::instrument(name = "assignments.list", skip(state, identity))]
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let assignments = state.services.assignments.list(&identity.actor()).await?;
    Ok(Json(assignments))
}

#[tracing::instrument(name = "assignments.get", skip(state, identity), fields(%assignment_id))]
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(assignment_id): ApiPath<Uuid>,
) -> Result<Json<Assignment>, ApiError> {
    let assignment = state
        .services
        .assignments
        .get(&identity.actor(), assignment_id)
        .await?;
    Ok(Json(assignment))
}

/// Multipart: `title`, optional `description`, required `file`.
#[tracing::instrument(name = "assignments.submit", skip(state, identity, multipart))]
pub async fn submit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    let mut form = FormData::read(multipart).await?;
    let input = SubmitAssignment {
        title: form.required_text("title")?,
        description: form.optional_text("description"),
    };
    let file = form.take_file(&["file"]);

    let assignment = state
        .services
        .assignments
        .submit(&identity.actor(), input, file)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse {
            message: "Assignment submitted",
            assignment,
        }),
    ))
}

#[tracing::instrument(
    name = "assignments.grade",
    skip(state, identity, input),
    fields(%assignment_id, score = input.score)
)]
pub async fn grade(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(assignment_id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<GradeAssignment>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = state
        .services
        .assignments
        .grade(&identity.actor(), assignment_id, input)
        .await?;
    Ok(Json(AssignmentResponse {
        message: "Assignment graded",
        assignment,
    }))
}

/// Multipart: `title`, optional `description`, optional replacement `file`.
#[tracing::instrument(name = "assignments.update", skip(state, identity, multipart), fields(%assignment_id))]
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(assignment_id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let input = UpdateAssignment {
        title: form.required_text("title")?,
        description: form.optional_text("description"),
    };
    let file = form.take_file(&["file"]);

    let assignment = state
        .services
        .assignments
        .update(&identity.actor(), assignment_id, input, file)
        .await?;
    Ok(Json(AssignmentResponse {
        message: "Assignment updated",
        assignment,
    }))
}

#[tracing::instrument(name = "assignments.delete", skip(state, identity), fields(%assignment_id))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(assignment_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .services
        .assignments
        .delete(&identity.actor(), assignment_id)
        .await?;
    Ok(Json(MessageResponse::new("Assignment deleted")))
}

#[tracing::instrument(name = "assignments.pending", skip(state, identity))]
pub async fn pending(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let assignments = state.services.assignments.pending(&identity.actor()).await?;
    Ok(Json(assignments))
}

#[tracing::instrument(name = "assignments.graded", skip(state, identity))]
pub async fn graded(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let assignments = state.services.assignments.graded(&identity.actor()).await?;
    Ok(Json(assignments))
}
