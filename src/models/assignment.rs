use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{FileRef, validate_not_blank};

/// Lowest accepted score.
pub const MIN_SCORE: i64 = 0;
/// Highest accepted score.
pub const MAX_SCORE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Graded,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Graded => "graded",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "graded" => Ok(Self::Graded),
            other => Err(format!("Invalid assignment status: {}", other)),
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A student's submitted work.
///
/// `score` and `teacher_id` are set together with `status = graded` and
/// never independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: String,
    pub student_id: Uuid,
    pub student_name: String,
    /// Teacher who claimed the submission by grading it.
    pub teacher_id: Option<Uuid>,
    pub teacher_name: Option<String>,
    pub score: Option<i64>,
    pub comment: Option<String>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAssignment {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAssignment {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GradeAssignment {
    #[validate(range(min = 0, max = 100))]
    pub score: i64,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

/// Row-level insert used by the repository. Status and grading fields are
/// not part of the insert; a new row is always pending and unclaimed.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub file: FileRef,
    pub student_id: Uuid,
}

/// Row-level update of the student-editable fields.
#[derive(Debug, Clone)]
pub struct AssignmentChanges {
    pub title: String,
    pub description: Option<String>,
    pub file: Option<FileRef>,
}
