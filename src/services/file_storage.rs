//! File storage for uploaded documents, videos and profile images.
//!
//! Files are addressed by a relative key of the form `{folder}/{name}`
//! (e.g. `tugas/essay_1718000000000-4821.pdf`). The key is what the public
//! path is built from, so backends must never rewrite it.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors that can occur during file storage operations.
#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FileStorageResult<T> = Result<T, FileStorageError>;

/// Trait for file storage backends.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store content under `key`, replacing anything already there.
    async fn store(&self, key: &str, content: &[u8]) -> FileStorageResult<()>;

    /// Retrieve the content stored under `key`.
    async fn retrieve(&self, key: &str) -> FileStorageResult<Vec<u8>>;

    /// Delete the content stored under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> FileStorageResult<()>;

    /// Check whether anything is stored under `key`.
    async fn exists(&self, key: &str) -> FileStorageResult<bool>;

    /// Get the backend type name (for logging/debugging).
    fn backend_name(&self) -> &'static str;
}

/// Filesystem storage rooted at the configured uploads directory.
///
/// Files are stored as `{root}/{key}`.
pub struct FilesystemFileStorage {
    root: PathBuf,
}

impl FilesystemFileStorage {
    /// Open (and create if needed) the storage root.
    pub fn new(root: impl Into<PathBuf>) -> FileStorageResult<Self> {
        let root = root.into();
        if !root.exists() {
            info!(path = %root.display(), "Creating upload storage directory");
            std::fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path below the root, rejecting anything that could
    /// escape it.
    fn file_path(&self, key: &str) -> FileStorageResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(FileStorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for FilesystemFileStorage {
    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn store(&self, key: &str, content: &[u8]) -> FileStorageResult<()> {
        let path = self.file_path(key)?;
        debug!(key, path = %path.display(), "Storing file on filesystem");

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a temp file first, then rename into place
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".part");
        let temp_path = PathBuf::from(temp_name);

        tokio::fs::write(&temp_path, content).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(FileStorageError::Io(e));
        }

        info!(key, "File stored successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, key: &str) -> FileStorageResult<Vec<u8>> {
        let path = self.file_path(key)?;

        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(FileStorageError::Io(e)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> FileStorageResult<()> {
        let path = self.file_path(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(key, "File deleted successfully");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(key, "File not found during deletion");
                Ok(())
            }
            Err(e) => Err(FileStorageError::Io(e)),
        }
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> FileStorageResult<bool> {
        let path = self.file_path(key)?;
        Ok(tokio::fs::metadata(&path).await.is_ok())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
