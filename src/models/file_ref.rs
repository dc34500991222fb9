use serde::{Deserialize, Serialize};

/// Reference to an accepted and persisted upload.
///
/// `path` is the public path the file is served under (e.g.
/// `/uploads/tugas/essay_1718000000000-42.pdf`), `media_type` is the
/// declared MIME type that passed the upload policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
    pub media_type: String,
}

impl FileRef {
    pub fn new(path: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
        }
    }
}
