//! Multipart form reading shared by the upload endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;

use super::error::ApiError;
use crate::services::IncomingFile;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A fully read multipart form: text fields and file parts by field name.
///
/// A file part with an empty file name and no content (what browsers send
/// for an untouched file input) is treated as absent.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, IncomingFile>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name.is_empty() {
                continue;
            }

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or(DEFAULT_CONTENT_TYPE)
                        .to_string();
                    let bytes = field.bytes().await?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        IncomingFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field, `None` when absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// A text field that is `None` when absent or blank.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    /// A required text field. Blank values are left to model validation.
    pub fn required_text(&self, name: &str) -> Result<String, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::bad_request("validation_error", format!("{} is required", name)))
    }

    /// Take the first file present under any of `names`.
    pub fn take_file(&mut self, names: &[&str]) -> Option<IncomingFile> {
        names.iter().find_map(|name| self.files.remove(*name))
    }
}
