use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{FileRef, validate_not_blank, validate_video_url};

/// Where a material's video lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoKind {
    /// A file uploaded to this server.
    Upload,
    /// A link to an external video host.
    ExternalLink,
}

impl VideoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::ExternalLink => "external-link",
        }
    }
}

impl FromStr for VideoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(Self::Upload),
            "external-link" => Ok(Self::ExternalLink),
            other => Err(format!("Invalid video kind: {}", other)),
        }
    }
}

impl fmt::Display for VideoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A video attached to a material: either an uploaded file path or an external URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialVideo {
    pub url: String,
    pub kind: VideoKind,
}

impl MaterialVideo {
    pub fn uploaded(file: &FileRef) -> Self {
        Self {
            url: file.path.clone(),
            kind: VideoKind::Upload,
        }
    }

    pub fn external(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: VideoKind::ExternalLink,
        }
    }
}

/// A teacher-authored learning resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub video_url: Option<String>,
    pub video_type: Option<VideoKind>,
    pub teacher_id: Uuid,
    /// Display name of the owning teacher.
    pub teacher_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// The uploaded video file, if the current video is an upload.
    pub fn uploaded_video_path(&self) -> Option<&str> {
        match self.video_type {
            Some(VideoKind::Upload) => self.video_url.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMaterial {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMaterial {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
}

/// Create a material whose only content is an external video link.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVideoLinkMaterial {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_video_url"))]
    pub youtube_url: String,
}

/// Row-level insert used by the repository.
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub description: Option<String>,
    pub document: Option<FileRef>,
    pub video: Option<MaterialVideo>,
    pub teacher_id: Uuid,
}
