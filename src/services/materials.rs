use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{IncomingFile, ServiceError, ServiceResult, UploadKind, Uploads};
use crate::{
    authz::{Actor, MaterialAction, decide},
    db::DbPool,
    models::{
        CreateMaterial, CreateVideoLinkMaterial, Material, MaterialVideo, NewMaterial,
        UpdateMaterial, validate_video_url,
    },
};

/// The video to attach to a material.
#[derive(Debug, Clone)]
pub enum VideoSource {
    Upload(IncomingFile),
    Link(String),
}

#[derive(Clone)]
pub struct MaterialService {
    db: Arc<DbPool>,
    uploads: Uploads,
}

impl MaterialService {
    pub fn new(db: Arc<DbPool>, uploads: Uploads) -> Self {
        Self { db, uploads }
    }

    pub async fn list(&self, actor: &Actor) -> ServiceResult<Vec<Material>> {
        let scope = decide(actor, MaterialAction::Read)?;
        Ok(self.db.materials().list(&scope).await?)
    }

    /// Materials owned by the caller; admins see all of them.
    pub async fn list_own(&self, actor: &Actor) -> ServiceResult<Vec<Material>> {
        let scope = decide(actor, MaterialAction::ListOwn)?;
        Ok(self.db.materials().list(&scope).await?)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> ServiceResult<Material> {
        let scope = decide(actor, MaterialAction::Read)?;
        Ok(self.db.materials().get(id, &scope).await?)
    }

    /// Create a material owned by the caller, with an optional document.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateMaterial,
        document: Option<IncomingFile>,
    ) -> ServiceResult<Material> {
        decide(actor, MaterialAction::Create)?;
        input.validate()?;

        let document = self
            .uploads
            .accept_optional(UploadKind::MaterialDocument, document)
            .await?;

        let result = self
            .db
            .materials()
            .create(NewMaterial {
                title: input.title,
                description: input.description,
                document: document.clone(),
                video: None,
                teacher_id: actor.id,
            })
            .await;

        match result {
            Ok(material) => {
                tracing::info!(material_id = %material.id, "Material created");
                Ok(material)
            }
            Err(e) => {
                self.uploads.discard_ref(document.as_ref()).await;
                Err(e.into())
            }
        }
    }

    /// Create a material whose only content is an external video link.
    pub async fn create_video_link(
        &self,
        actor: &Actor,
        input: CreateVideoLinkMaterial,
    ) -> ServiceResult<Material> {
        decide(actor, MaterialAction::Create)?;
        input.validate()?;

        let material = self
            .db
            .materials()
            .create(NewMaterial {
                title: input.title,
                description: input.description,
                document: None,
                video: Some(MaterialVideo::external(input.youtube_url)),
                teacher_id: actor.id,
            })
            .await?;
        Ok(material)
    }

    /// Attach or replace a material's video. A previously uploaded video file
    /// is removed once the new one is recorded.
    pub async fn attach_video(
        &self,
        actor: &Actor,
        id: Uuid,
        source: VideoSource,
    ) -> ServiceResult<Material> {
        let scope = decide(actor, MaterialAction::AttachVideo)?;
        let existing = self.db.materials().get(id, &scope).await?;

        let (video, accepted) = match source {
            VideoSource::Upload(file) => {
                let file = self.uploads.accept(UploadKind::Video, file).await?;
                (MaterialVideo::uploaded(&file), Some(file))
            }
            VideoSource::Link(url) => {
                validate_video_url(&url).map_err(|e| {
                    ServiceError::Rule(
                        e.message
                            .map(|m| m.into_owned())
                            .unwrap_or_else(|| "Invalid video URL".to_string()),
                    )
                })?;
                (MaterialVideo::external(url), None)
            }
        };

        let material = match self.db.materials().set_video(id, &scope, video).await {
            Ok(material) => material,
            Err(e) => {
                self.uploads.discard_ref(accepted.as_ref()).await;
                return Err(e.into());
            }
        };

        if let Some(old) = existing.uploaded_video_path()
            && material.video_url.as_deref() != Some(old)
        {
            self.uploads.discard(old).await;
        }
        Ok(material)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateMaterial,
    ) -> ServiceResult<Material> {
        let scope = decide(actor, MaterialAction::Update)?;
        input.validate()?;
        Ok(self.db.materials().update(id, &scope, input).await?)
    }

    /// Delete a material and the files it references.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let scope = decide(actor, MaterialAction::Delete)?;
        let existing = self.db.materials().get(id, &scope).await?;
        self.db.materials().delete(id, &scope).await?;

        if let Some(path) = existing.file_path.as_deref() {
            self.uploads.discard(path).await;
        }
        if let Some(path) = existing.uploaded_video_path() {
            self.uploads.discard(path).await;
        }
        tracing::info!(material_id = %id, "Material deleted");
        Ok(())
    }
}
