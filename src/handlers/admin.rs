// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::questions::QUESTION_COLUMNS,
    models::{
        question::{CreateQuestionRequest, Question},
        user::User,
    },
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Creates a new question.
/// Admin only.
pub async fn create_question(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = sqlx::query_as::<_, Question>(&format!(
        r#"
        INSERT INTO questions (title, description, difficulty, tags, sample_input, sample_output)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {QUESTION_COLUMNS}
        "#
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.difficulty)
    .bind(SqlJson(&payload.tags))
    .bind(&payload.sample_input)
    .bind(&payload.sample_output)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Overwrites an existing question with the supplied fields.
/// Admin only. 404 when the question does not exist.
pub async fn update_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = sqlx::query_as::<_, Question>(&format!(
        r#"
        UPDATE questions
        SET title = $2, description = $3, difficulty = $4,
            tags = $5, sample_input = $6, sample_output = $7
        WHERE id = $1
        RETURNING {QUESTION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.difficulty)
    .bind(SqlJson(&payload.tags))
    .bind(&payload.sample_input)
    .bind(&payload.sample_output)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Deletes a question by ID.
/// Admin only. 404 when the question does not exist.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "message": "Question deleted successfully"
    })))
}
