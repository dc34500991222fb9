//! Learning material endpoints under `/api/materials`.

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
    models::{CreateMaterial, CreateVideoLinkMaterial, Material, UpdateMaterial},
    services::VideoSource,
};

#[derive(Debug, Serialize)]
pub struct MaterialResponse {
    pub message: &'static str,
    pub material: Material,
}

#[tracing::instrument(name = "materials.list", skip(state, identity))]
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Material>>, ApiError> {
    let materials = state.services.materials.list(&identity.actor()).await?;
    Ok(Json(materials))
}

#[tracing::instrument(name = "materials.mine", skip(state, identity))]
pub async fn mine(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Material>>, ApiError> {
    let materials = state.services.materials.list_own(&identity.actor()).await?;
    Ok(Json(materials))
}

#[tracing::instrument(name = "materials.get", skip(state, identity), fields(%material_id))]
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(material_id): ApiPath<Uuid>,
) -> Result<Json<Material>, ApiError> {
    let material = state
        .services
        .materials
        .get(&identity.actor(), material_id)
        .await?;
    Ok(Json(material))
}

/// Multipart: `title`, optional `description`, optional `file`.
#[tracing::instrument(name = "materials.create", skip(state, identity, multipart))]
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    let mut form = FormData::read(multipart).await?;
    let input = CreateMaterial {
        title: form.required_text("title")?,
        description: form.optional_text("description"),
    };
    let document = form.take_file(&["file"]);

    let material = state
        .services
        .materials
        .create(&identity.actor(), input, document)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MaterialResponse {
            message: "Material created",
            material,
        }),
    ))
}

/// Multipart: a `video` file or a `youtube_url` field. An uploaded file wins
/// when both are sent.
#[tracing::instrument(name = "materials.attach_video", skip(state, identity, multipart), fields(%material_id))]
pub async fn attach_video(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(material_id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<MaterialResponse>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let source = match (form.take_file(&["video"]), form.optional_text("youtube_url")) {
        (Some(file), _) => VideoSource::Upload(file),
        (None, Some(url)) => VideoSource::Link(url),
        (None, None) => {
            return Err(ApiError::bad_request(
                "validation_error",
                "A video file or YouTube URL is required",
            ));
        }
    };

    let material = state
        .services
        .materials
        .attach_video(&identity.actor(), material_id, source)
        .await?;
    Ok(Json(MaterialResponse {
        message: "Material video updated",
        material,
    }))
}

#[tracing::instrument(name = "materials.create_video_link", skip(state, identity, input))]
pub async fn create_video_link(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidJson(input): ValidJson<CreateVideoLinkMaterial>,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    let material = state
        .services
        .materials
        .create_video_link(&identity.actor(), input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MaterialResponse {
            message: "Video material created",
            material,
        }),
    ))
}

#[tracing::instrument(name = "materials.update", skip(state, identity, input), fields(%material_id))]
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(material_id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateMaterial>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material = state
        .services
        .materials
        .update(&identity.actor(), material_id, input)
        .await?;
    Ok(Json(MaterialResponse {
        message: "Material updated",
        material,
    }))
}

#[tracing::instrument(name = "materials.delete", skip(state, identity), fields(%material_id))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(material_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .services
        .materials
        .delete(&identity.actor(), material_id)
        .await?;
    Ok(Json(MessageResponse::new("Material deleted")))
}
