// src/handlers/leaderboard.rs

use axum::{Json, extract::{Path, State}, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::stats::{LeaderboardEntry, LeaderboardMetric, rank},
};

/// Derives the leaderboard for the requested metric.
///
/// Reads every stats row joined with its user (no filtering; a zeroed row
/// participates too), sorts in process and returns the full board. An
/// unrecognized metric name falls back to questions solved. An empty board
/// maps to 404, matching the historic API.
pub async fn get_leaderboard(
    State(pool): State<PgPool>,
    Path(metric): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entries = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT s.user_id, u.name,
               s.questions_solved, s.accepted_submissions,
               s.total_submissions, s.accuracy
        FROM user_stats s
        JOIN users u ON u.id = s.user_id
        ORDER BY s.user_id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let board = rank(entries, LeaderboardMetric::parse(&metric));

    if board.is_empty() {
        return Err(AppError::NotFound("No leaderboard data found".to_string()));
    }

    Ok(Json(board))
}
