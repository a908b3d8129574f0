// src/handlers/submissions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppError,
    feedback::FeedbackGenerator,
    models::{
        question::Question,
        stats::UserStats,
        submission::{
            Submission, SubmissionFeedbackResponse, SubmitCodeRequest, SubmitReceipt,
            UpdateSubmissionRequest, is_accepted,
        },
        user::User,
    },
};

const SUBMISSION_COLUMNS: &str = "id, user_id, question_id, code, language, status, submitted_at";

/// Creates the zeroed stats row for a user if it does not exist yet.
/// Both registration (eager) and the recorder (lazy) go through this, so
/// the two creation paths cannot diverge.
pub(crate) async fn ensure_stats_row<'e, E>(executor: E, user_id: i64) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("INSERT INTO user_stats (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Records a code submission and updates the owner's running counters.
///
/// Reference checks run in order, each short-circuiting with its own
/// descriptive outcome before anything is written:
/// missing user, missing question, unresolvable user, unresolvable question.
///
/// The first-solve probe (any *prior* accepted submission for this
/// user/question pair) runs before the insert so the new row cannot count
/// against itself. Insert and counter update share one transaction, with
/// the stats row locked FOR UPDATE, so two concurrent submissions by the
/// same user cannot drop an increment.
pub async fn submit_code(
    State(pool): State<PgPool>,
    Json(payload): Json<SubmitCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = match payload.user_id {
        Some(id) if id > 0 => id,
        _ => {
            return Err(AppError::BadRequest(
                "User is missing or user id is null".to_string(),
            ));
        }
    };

    let question_id = match payload.question_id {
        Some(id) if id > 0 => id,
        _ => {
            return Err(AppError::BadRequest(
                "Question is missing or question id is null".to_string(),
            ));
        }
    };

    // Resolve both references against the stores before writing anything,
    // using the authoritative rows rather than whatever the caller sent.
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password, role, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(
        "Invalid user id or user not found".to_string(),
    ))?;

    let question = sqlx::query_as::<_, Question>(
        "SELECT id, title, description, difficulty, tags, sample_input, sample_output, created_at \
         FROM questions WHERE id = $1",
    )
    .bind(question_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(
        "Invalid question id or question not found".to_string(),
    ))?;

    let submitted_at = Utc::now();

    let mut tx = pool.begin().await?;

    // Observed before the insert: the new submission must not count as its
    // own prior solve.
    let pair_solved_before: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM submissions
            WHERE user_id = $1 AND question_id = $2 AND LOWER(status) = 'accepted'
        )
        "#,
    )
    .bind(user.id)
    .bind(question.id)
    .fetch_one(&mut *tx)
    .await?;

    let submission_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO submissions (user_id, question_id, code, language, status, submitted_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(user.id)
    .bind(question.id)
    .bind(&payload.code)
    .bind(&payload.language)
    .bind(&payload.status)
    .bind(submitted_at)
    .fetch_one(&mut *tx)
    .await?;

    ensure_stats_row(&mut *tx, user.id).await?;

    let mut stats = sqlx::query_as::<_, UserStats>(
        r#"
        SELECT user_id, total_submissions, accepted_submissions, questions_solved, accuracy
        FROM user_stats WHERE user_id = $1
        FOR UPDATE
        "#,
    )
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;

    stats.record_submission(is_accepted(&payload.status), pair_solved_before);

    sqlx::query(
        r#"
        UPDATE user_stats
        SET total_submissions = $2, accepted_submissions = $3,
            questions_solved = $4, accuracy = $5
        WHERE user_id = $1
        "#,
    )
    .bind(stats.user_id)
    .bind(stats.total_submissions)
    .bind(stats.accepted_submissions)
    .bind(stats.questions_solved)
    .bind(stats.accuracy)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        question_id = question.id,
        submission_id,
        status = %payload.status,
        "Submission recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitReceipt {
            submission_id,
            user_id: user.id,
            question_id: question.id,
            status: payload.status,
            submitted_at,
            message: format!(
                "Code successfully submitted by {} for the question \"{}\"",
                user.name, question.title
            ),
        }),
    ))
}

/// Lists all submissions made by a user.
pub async fn list_by_user(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE user_id = $1 ORDER BY submitted_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(submissions))
}

/// Lists all submissions made against a question.
pub async fn list_by_question(
    State(pool): State<PgPool>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE question_id = $1 ORDER BY submitted_at DESC"
    ))
    .bind(question_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(submissions))
}

/// Fetches a single submission by ID.
pub async fn get_submission(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let submission = sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(submission))
}

/// Overwrites a submission's mutable fields (code, language, status,
/// timestamp). Deliberately does not touch the owner's counters.
pub async fn update_submission(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let submission = sqlx::query_as::<_, Submission>(&format!(
        r#"
        UPDATE submissions
        SET code = $2, language = $3, status = $4,
            submitted_at = COALESCE($5, submitted_at)
        WHERE id = $1
        RETURNING {SUBMISSION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&payload.code)
    .bind(&payload.language)
    .bind(&payload.status)
    .bind(payload.submitted_at)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(submission))
}

/// Deletes a submission by ID. Counters are left alone.
pub async fn delete_submission(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Submission not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "message": "Submission deleted successfully"
    })))
}

/// Row shape for the feedback endpoint: submission joined with its owner
/// and question.
#[derive(FromRow)]
struct SubmissionContext {
    id: i64,
    code: String,
    status: String,
    language: String,
    submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    user_id: i64,
    user_name: String,
    question_id: i64,
    question_title: String,
}

/// Generates AI feedback for a recorded submission and returns the
/// submission enriched with it. The counters path never depends on this.
pub async fn submission_feedback(
    State(pool): State<PgPool>,
    State(feedback): State<Arc<dyn FeedbackGenerator>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = sqlx::query_as::<_, SubmissionContext>(
        r#"
        SELECT s.id, s.code, s.status, s.language, s.submitted_at,
               s.user_id, u.name AS user_name,
               s.question_id, q.title AS question_title
        FROM submissions s
        JOIN users u ON u.id = s.user_id
        JOIN questions q ON q.id = s.question_id
        WHERE s.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Submission not found".to_string()))?;

    let text = feedback.generate(&ctx.code, &ctx.language).await?;

    Ok(Json(SubmissionFeedbackResponse {
        id: ctx.id,
        code: ctx.code,
        status: ctx.status,
        language: ctx.language,
        submitted_at: ctx.submitted_at,
        feedback: text,
        user_id: ctx.user_id,
        user_name: ctx.user_name,
        question_id: ctx.question_id,
        question_title: ctx.question_title,
    }))
}
