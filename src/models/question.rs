// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub title: String,

    /// Full problem statement.
    pub description: String,

    /// Difficulty label (e.g., "Easy", "Medium", "Hard"). Free text.
    pub difficulty: String,

    /// Topic tags (e.g., ["arrays", "dp"]).
    /// Stored as a JSON array in the database.
    pub tags: Json<Vec<String>>,

    pub sample_input: Option<String>,
    pub sample_output: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
    #[validate(length(min = 1, max = 20))]
    pub difficulty: String,
    #[validate(custom(function = validate_tags))]
    pub tags: Vec<String>,
    #[validate(length(max = 5000))]
    pub sample_input: Option<String>,
    #[validate(length(max = 5000))]
    pub sample_output: Option<String>,
}

/// Query parameters for keyword search over title/description.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
}

/// Query parameters for tag search.
#[derive(Debug, Deserialize)]
pub struct TagSearchParams {
    pub tag: Option<String>,
}

fn validate_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    for tag in tags {
        if tag.is_empty() || tag.len() > 50 {
            return Err(validator::ValidationError::new("invalid_tag_length"));
        }
    }
    Ok(())
}
