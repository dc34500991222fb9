//! Upload acceptance: checks a file against the policy for its kind, gives it
//! a collision-free name and persists it through [`FileStorage`].
//!
//! Acceptance always completes before the owning row is written, so a row
//! never references a file that was not stored.

use std::{path::Path, sync::Arc};

use bytes::Bytes;
use rand::Rng;
use thiserror::Error;

use super::file_storage::{FileStorage, FileStorageError};
use crate::{
    config::{StorageConfig, UploadLimitsConfig},
    models::FileRef,
};

const DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

const VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/wmv",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-ms-wmv",
];

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    UnsupportedType(String),

    #[error("File is too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("No {0} file was uploaded")]
    Missing(&'static str),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] FileStorageError),
}

/// What an upload is for. Each kind has its own media types, size ceiling
/// and storage folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    MaterialDocument,
    AssignmentDocument,
    Video,
    ProfileImage,
}

impl UploadKind {
    pub fn folder(&self) -> &'static str {
        match self {
            Self::MaterialDocument | Self::Video => "materi",
            Self::AssignmentDocument => "tugas",
            Self::ProfileImage => "profiles",
        }
    }

    pub fn media_types(&self) -> &'static [&'static str] {
        match self {
            Self::MaterialDocument | Self::AssignmentDocument => DOCUMENT_TYPES,
            Self::Video => VIDEO_TYPES,
            Self::ProfileImage => IMAGE_TYPES,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::MaterialDocument | Self::AssignmentDocument => "document",
            Self::Video => "video",
            Self::ProfileImage => "image",
        }
    }

    fn rejection(&self) -> &'static str {
        match self {
            Self::MaterialDocument | Self::AssignmentDocument => {
                "Only PDF, DOC, DOCX, PPT and PPTX files are allowed"
            }
            Self::Video => "Only MP4, AVI, MOV and WMV videos are allowed",
            Self::ProfileImage => "Only JPEG, JPG, PNG and GIF images are allowed",
        }
    }
}

/// The rules one upload kind is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub kind: UploadKind,
    pub max_bytes: u64,
}

impl UploadPolicy {
    pub fn for_kind(kind: UploadKind, limits: &UploadLimitsConfig) -> Self {
        let max_bytes = match kind {
            UploadKind::MaterialDocument => limits.material_document_bytes,
            UploadKind::AssignmentDocument => limits.assignment_document_bytes,
            UploadKind::Video => limits.video_bytes,
            UploadKind::ProfileImage => limits.profile_image_bytes,
        };
        Self { kind, max_bytes }
    }

    /// Check the declared media type and size. Media type parameters
    /// (`; charset=...`) are ignored.
    pub fn check(&self, file: &IncomingFile) -> Result<(), UploadError> {
        let essence = file
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !self.kind.media_types().contains(&essence.as_str()) {
            return Err(UploadError::UnsupportedType(self.kind.rejection().to_string()));
        }

        let size = file.bytes.len() as u64;
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// A file received from a multipart request, not yet accepted.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Build a stored file name: the original stem with anything other than
/// ASCII letters and digits replaced by `_`, a unique suffix and the original
/// extension.
pub fn stored_file_name(original: &str, millis: i64, nonce: u32) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("file");
    }

    let extension: String = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if extension.is_empty() {
        format!("{}_{}-{}", name, millis, nonce)
    } else {
        format!("{}_{}-{}.{}", name, millis, nonce, extension)
    }
}

/// Accepts uploads and maps between storage keys and public paths.
#[derive(Clone)]
pub struct Uploads {
    storage: Arc<dyn FileStorage>,
    public_prefix: String,
    limits: UploadLimitsConfig,
}

impl Uploads {
    pub fn new(storage: Arc<dyn FileStorage>, config: &StorageConfig) -> Self {
        Self {
            storage,
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            limits: config.limits.clone(),
        }
    }

    pub fn policy(&self, kind: UploadKind) -> UploadPolicy {
        UploadPolicy::for_kind(kind, &self.limits)
    }

    /// Check and store a file, returning the reference to persist on the row.
    #[tracing::instrument(
        name = "uploads.accept",
        skip(self, file),
        fields(file_name = %file.file_name, size = file.bytes.len())
    )]
    pub async fn accept(&self, kind: UploadKind, file: IncomingFile) -> Result<FileRef, UploadError> {
        let policy = self.policy(kind);
        policy.check(&file)?;

        let millis = chrono::Utc::now().timestamp_millis();
        let nonce = rand::thread_rng().gen_range(0..1_000_000_000);
        let key = format!(
            "{}/{}",
            kind.folder(),
            stored_file_name(&file.file_name, millis, nonce)
        );

        self.storage.store(&key, &file.bytes).await?;
        tracing::debug!(key = %key, kind = kind.label(), "Upload accepted");

        Ok(FileRef::new(self.public_path(&key), file.content_type))
    }

    /// Accept an optional file; `None` passes through.
    pub async fn accept_optional(
        &self,
        kind: UploadKind,
        file: Option<IncomingFile>,
    ) -> Result<Option<FileRef>, UploadError> {
        match file {
            Some(file) => self.accept(kind, file).await.map(Some),
            None => Ok(None),
        }
    }

    /// Accept a file that the operation requires.
    pub async fn accept_required(
        &self,
        kind: UploadKind,
        file: Option<IncomingFile>,
    ) -> Result<FileRef, UploadError> {
        let file = file.ok_or(UploadError::Missing(kind.label()))?;
        self.accept(kind, file).await
    }

    /// Remove a previously accepted file by its public path.
    ///
    /// Best effort: failures are logged and swallowed, and paths outside the
    /// public prefix (such as external video links) are ignored.
    pub async fn discard(&self, public_path: &str) {
        let Some(key) = self.storage_key(public_path) else {
            return;
        };
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(path = %public_path, error = %e, "Failed to remove stored upload");
        }
    }

    /// Discard the file behind an optional reference.
    pub async fn discard_ref(&self, file: Option<&FileRef>) {
        if let Some(file) = file {
            self.discard(&file.path).await;
        }
    }

    fn public_path(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix, key)
    }

    fn storage_key<'a>(&self, public_path: &'a str) -> Option<&'a str> {
        public_path
            .strip_prefix(self.public_prefix.as_str())?
            .strip_prefix('/')
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::services::file_storage::FilesystemFileStorage;

    fn incoming(name: &str, content_type: &str, size: usize) -> IncomingFile {
        IncomingFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    fn uploads(dir: &TempDir) -> Uploads {
        let storage = FilesystemFileStorage::new(dir.path()).unwrap();
        let config = StorageConfig {
            uploads_dir: dir.path().to_path_buf(),
            public_prefix: "/uploads".to_string(),
            limits: UploadLimitsConfig {
                material_document_bytes: 1000,
                assignment_document_bytes: 500,
                video_bytes: 2000,
                profile_image_bytes: 100,
            },
        };
        Uploads::new(Arc::new(storage), &config)
    }

    #[rstest]
    #[case("Laporan Akhir (v2).pdf", "Laporan_Akhir__v2__1700000000000-42.pdf")]
    #[case("essay.docx", "essay_1700000000000-42.docx")]
    #[case("no_extension", "no_extension_1700000000000-42")]
    #[case("../../etc/passwd", "passwd_1700000000000-42")]
    #[case(".pdf", "_pdf_1700000000000-42")]
    fn test_stored_file_name(#[case] original: &str, #[case] expected: &str) {
        assert_eq!(stored_file_name(original, 1_700_000_000_000, 42), expected);
    }

    #[rstest]
    #[case(UploadKind::MaterialDocument, "application/pdf", true)]
    #[case(UploadKind::AssignmentDocument, "application/vnd.ms-powerpoint", true)]
    #[case(UploadKind::AssignmentDocument, "image/png", false)]
    #[case(UploadKind::Video, "video/quicktime", true)]
    #[case(UploadKind::Video, "video/webm", false)]
    #[case(UploadKind::ProfileImage, "image/gif", true)]
    #[case(UploadKind::ProfileImage, "IMAGE/PNG; charset=binary", true)]
    #[case(UploadKind::ProfileImage, "application/pdf", false)]
    fn test_media_type_policy(
        #[case] kind: UploadKind,
        #[case] content_type: &str,
        #[case] accepted: bool,
    ) {
        let policy = UploadPolicy::for_kind(kind, &UploadLimitsConfig::default());
        let result = policy.check(&incoming("f.bin", content_type, 10));
        assert_eq!(result.is_ok(), accepted, "{:?}", result);
    }

    #[test]
    fn test_default_limits() {
        let limits = UploadLimitsConfig::default();
        assert_eq!(
            UploadPolicy::for_kind(UploadKind::AssignmentDocument, &limits).max_bytes,
            20 * 1024 * 1024
        );
        assert_eq!(
            UploadPolicy::for_kind(UploadKind::Video, &limits).max_bytes,
            200 * 1024 * 1024
        );
    }

    #[tokio::test]
    async fn test_accept_stores_under_folder() {
        let dir = TempDir::new().unwrap();
        let uploads = uploads(&dir);

        let file_ref = uploads
            .accept(
                UploadKind::AssignmentDocument,
                incoming("essay.pdf", "application/pdf", 100),
            )
            .await
            .unwrap();

        assert!(file_ref.path.starts_with("/uploads/tugas/essay_"));
        assert!(file_ref.path.ends_with(".pdf"));
        assert_eq!(file_ref.media_type, "application/pdf");

        let key = file_ref.path.trim_start_matches("/uploads/");
        assert!(dir.path().join(key).exists());
    }

    #[tokio::test]
    async fn test_too_large_is_rejected_before_storage() {
        let dir = TempDir::new().unwrap();
        let uploads = uploads(&dir);

        let result = uploads
            .accept(
                UploadKind::AssignmentDocument,
                incoming("big.pdf", "application/pdf", 501),
            )
            .await;

        assert!(matches!(
            result,
            Err(UploadError::TooLarge { size: 501, max: 500 })
        ));
        assert!(!dir.path().join("tugas").exists());
    }

    #[tokio::test]
    async fn test_accept_required_missing() {
        let dir = TempDir::new().unwrap();
        let uploads = uploads(&dir);

        let result = uploads
            .accept_required(UploadKind::AssignmentDocument, None)
            .await;
        assert!(matches!(result, Err(UploadError::Missing("document"))));
    }

    #[tokio::test]
    async fn test_discard_removes_and_ignores_foreign_paths() {
        let dir = TempDir::new().unwrap();
        let uploads = uploads(&dir);

        let file_ref = uploads
            .accept(
                UploadKind::ProfileImage,
                incoming("me.png", "image/png", 10),
            )
            .await
            .unwrap();
        let key = file_ref.path.trim_start_matches("/uploads/").to_string();

        uploads.discard("https://youtu.be/abc").await;
        uploads.discard("/uploads/").await;
        assert!(dir.path().join(&key).exists());

        uploads.discard(&file_ref.path).await;
        assert!(!dir.path().join(&key).exists());
    }
}
