//! Account administration and profile endpoints under `/api/users`.

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
    models::{CreateUser, SystemStats, UpdateProfile, UpdateUser, User},
};

/// Form field names accepted for a profile image upload.
const PROFILE_IMAGE_FIELDS: &[&str] = &["profile_image", "image"];

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProfileImageResponse {
    pub message: &'static str,
    pub profile_image: Option<String>,
    pub user: User,
}

#[tracing::instrument(name = "users.list", skip(state, identity))]
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.services.users.list(&identity.actor()).await?;
    Ok(Json(users))
}

#[tracing::instrument(name = "users.stats", skip(state, identity))]
pub async fn stats(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<SystemStats>, ApiError> {
    let stats = state.services.users.stats(&identity.actor()).await?;
    Ok(Json(stats))
}

#[tracing::instrument(name = "users.create", skip(state, identity, input), fields(role = %input.role))]
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidJson(input): ValidJson<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.services.users.create(&identity.actor(), input).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created",
            user,
        }),
    ))
}

#[tracing::instrument(name = "users.update", skip(state, identity, input), fields(%user_id))]
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(user_id): ApiPath<Uuid>,
    ValidJson(input): ValidJson<UpdateUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .services
        .users
        .update(&identity.actor(), user_id, input)
        .await?;
    Ok(Json(UserResponse {
        message: "User updated",
        user,
    }))
}

#[tracing::instrument(name = "users.delete", skip(state, identity), fields(%user_id))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .services
        .users
        .delete(&identity.actor(), user_id)
        .await?;
    Ok(Json(MessageResponse::new("User deleted")))
}

#[tracing::instrument(name = "users.profile", skip(state, identity))]
pub async fn profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<User>, ApiError> {
    let user = state.services.users.profile(&identity.actor()).await?;
    Ok(Json(user))
}

#[tracing::instrument(name = "users.update_profile", skip(state, identity, input))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidJson(input): ValidJson<UpdateProfile>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .services
        .users
        .update_profile(&identity.actor(), input)
        .await?;
    Ok(Json(UserResponse {
        message: "Profile updated",
        user,
    }))
}

#[tracing::instrument(name = "users.profile_image", skip(state, identity, multipart))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<Json<ProfileImageResponse>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let image = form.take_file(PROFILE_IMAGE_FIELDS);

    let user = state
        .services
        .users
        .set_profile_image(&identity.actor(), image)
        .await?;
    Ok(Json(ProfileImageResponse {
        message: "Profile image updated",
        profile_image: user.profile_image.clone(),
        user,
    }))
}
