use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use validator::ValidationError;

/// Recognized external video hosting URL shapes.
pub static VIDEO_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+")
        .expect("video URL pattern is valid")
});

/// Whether `url` points at a recognized video host.
pub fn is_external_video_url(url: &str) -> bool {
    VIDEO_URL_REGEX.is_match(url.trim())
}

/// Validator hook for external video URLs.
pub fn validate_video_url(url: &str) -> Result<(), ValidationError> {
    if is_external_video_url(url) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_video_url");
        err.message = Some(Cow::Borrowed("Invalid YouTube URL format"));
        Err(err)
    }
}

/// Reject strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("Value cannot be empty or whitespace-only"));
        return Err(err);
    }
    Ok(())
}
