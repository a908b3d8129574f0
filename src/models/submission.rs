// src/models/submission.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'submissions' table in the database.
/// Rows are append-only through the submit path; only the explicit update
/// operation may overwrite code/language/status/timestamp.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,

    pub code: String,

    /// Language label (e.g., "Rust", "Java"). Free text.
    pub language: String,

    /// Verdict label. Free text for backward compatibility; "Accepted"
    /// (case-insensitive) is the only value with special semantics.
    pub status: String,

    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Returns true when a status string counts as an accepted verdict.
pub fn is_accepted(status: &str) -> bool {
    status.eq_ignore_ascii_case("accepted")
}

/// DTO for recording a new submission.
/// The references are optional on purpose: a missing user or question is a
/// distinct descriptive outcome, not a deserialization failure.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitCodeRequest {
    pub user_id: Option<i64>,
    pub question_id: Option<i64>,
    #[validate(length(min = 1, message = "Code cannot be empty."))]
    pub code: String,
    #[validate(length(min = 1, max = 50))]
    pub language: String,
    #[validate(length(min = 1, max = 50))]
    pub status: String,
}

/// DTO for the explicit update operation. Overwrites the mutable fields.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubmissionRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1, max = 50))]
    pub language: String,
    #[validate(length(min = 1, max = 50))]
    pub status: String,
    /// When absent the stored timestamp is kept.
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Confirmation returned by the submit endpoint.
#[derive(Debug, Serialize)]
pub struct SubmitReceipt {
    pub submission_id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub status: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub message: String,
}

/// Submission enriched with owner/question context and AI feedback.
#[derive(Debug, Serialize)]
pub struct SubmissionFeedbackResponse {
    pub id: i64,
    pub code: String,
    pub status: String,
    pub language: String,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub feedback: String,
    pub user_id: i64,
    pub user_name: String,
    pub question_id: i64,
    pub question_title: String,
}
