//! Upload storage configuration.
//!
//! Uploaded documents, videos and profile images are written to a directory
//! on the local filesystem and served read-only under a public prefix.
//!
//! # Example Configuration
//!
//! ```toml
//! [storage]
//! uploads_dir = "/var/lms/uploads"
//! public_prefix = "/uploads"
//!
//! [storage.limits]
//! video_bytes = 209715200
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

const MB: u64 = 1024 * 1024;

/// Storage configuration for uploaded files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory for uploaded files.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// URL path prefix under which uploads are served and referenced.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,

    /// Per-kind size ceilings.
    #[serde(default)]
    pub limits: UploadLimitsConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            public_prefix: default_public_prefix(),
            limits: UploadLimitsConfig::default(),
        }
    }
}

impl StorageConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if !self.public_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "storage.public_prefix must start with '/'".into(),
            ));
        }
        let mount = self.public_prefix.trim_end_matches('/');
        if mount.is_empty() || mount == "/api" || mount.starts_with("/api/") {
            return Err(ConfigError::Validation(format!(
                "storage.public_prefix '{}' would shadow the API",
                self.public_prefix
            )));
        }
        self.limits.validate()
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./public/uploads")
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}

/// Maximum accepted size, in bytes, for each upload kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadLimitsConfig {
    /// Documents attached to materials.
    #[serde(default = "default_material_document")]
    pub material_document_bytes: u64,

    /// Documents submitted as assignments.
    #[serde(default = "default_assignment_document")]
    pub assignment_document_bytes: u64,

    /// Instructional videos.
    #[serde(default = "default_video")]
    pub video_bytes: u64,

    /// Profile images.
    #[serde(default = "default_profile_image")]
    pub profile_image_bytes: u64,
}

impl Default for UploadLimitsConfig {
    fn default() -> Self {
        Self {
            material_document_bytes: default_material_document(),
            assignment_document_bytes: default_assignment_document(),
            video_bytes: default_video(),
            profile_image_bytes: default_profile_image(),
        }
    }
}

impl UploadLimitsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("material_document_bytes", self.material_document_bytes),
            ("assignment_document_bytes", self.assignment_document_bytes),
            ("video_bytes", self.video_bytes),
            ("profile_image_bytes", self.profile_image_bytes),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "storage.limits.{} cannot be 0",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn default_material_document() -> u64 {
    50 * MB
}

fn default_assignment_document() -> u64 {
    20 * MB
}

fn default_video() -> u64 {
    200 * MB
}

fn default_profile_image() -> u64 {
    5 * MB
}
