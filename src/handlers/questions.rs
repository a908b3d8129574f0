// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::question::{Question, SearchParams, TagSearchParams},
};

pub(crate) const QUESTION_COLUMNS: &str =
    "id, title, description, difficulty, tags, sample_input, sample_output, created_at";

/// Lists all questions.
pub async fn list_questions(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY id"
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Fetches a single question by ID.
pub async fn get_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Searches questions whose title or description contains the keyword,
/// case-insensitively. A blank keyword is a validation outcome, not a match-all.
pub async fn search_questions(
    State(pool): State<PgPool>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let keyword = params.keyword.unwrap_or_default();
    if keyword.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Search keyword cannot be empty".to_string(),
        ));
    }

    let questions = sqlx::query_as::<_, Question>(&format!(
        r#"
        SELECT {QUESTION_COLUMNS} FROM questions
        WHERE title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%'
        ORDER BY id
        "#
    ))
    .bind(keyword.trim())
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}

/// Searches questions by tag, case-insensitively. The tags column is a JSON
/// array, so the match unnests it.
pub async fn search_by_tag(
    State(pool): State<PgPool>,
    Query(params): Query<TagSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let tag = params.tag.unwrap_or_default();
    if tag.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Search tag cannot be empty".to_string(),
        ));
    }

    let questions = sqlx::query_as::<_, Question>(&format!(
        r#"
        SELECT {QUESTION_COLUMNS} FROM questions
        WHERE EXISTS (
            SELECT 1 FROM jsonb_array_elements_text(tags) AS t
            WHERE t ILIKE '%' || $1 || '%'
        )
        ORDER BY id
        "#
    ))
    .bind(tag.trim())
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}
