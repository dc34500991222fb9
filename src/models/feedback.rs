use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Open,
    Closed,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(format!("Invalid feedback status: {}", other)),
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A student-submitted subject/message pair, closed once an admin responds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub subject: String,
    pub message: String,
    pub student_id: Uuid,
    pub student_name: String,
    pub status: FeedbackStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedback {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub subject: String,
    #[validate(length(min = 1, max = 1000), custom(function = "validate_not_blank"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFeedback {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub subject: String,
    #[validate(length(min = 1, max = 1000), custom(function = "validate_not_blank"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RespondFeedback {
    #[validate(length(min = 1, max = 1000), custom(function = "validate_not_blank"))]
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_message_limits() {
        let ok = CreateFeedback {
            subject: "s".repeat(200),
            message: "m".repeat(1000),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateFeedback {
            subject: "s".repeat(201),
            message: "m".repeat(1001),
        };
        let errors = too_long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("subject"));
        assert!(errors.field_errors().contains_key("message"));
    }

    #[test]
    fn test_response_limit() {
        let input = RespondFeedback {
            response: "r".repeat(1001),
        };
        assert!(input.validate().is_err());
    }
}
