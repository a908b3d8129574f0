// src/models/stats.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;

/// Represents the 'user_stats' table: one row of running counters per user,
/// keyed by the user's own id. Created zeroed at registration and lazily on
/// first submission through the same idempotent insert.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: i64,
    pub total_submissions: i64,
    pub accepted_submissions: i64,
    pub questions_solved: i64,
    /// Percentage, always recomputed from the two counters above.
    pub accuracy: f64,
}

impl UserStats {
    pub fn zeroed(user_id: i64) -> Self {
        Self {
            user_id,
            total_submissions: 0,
            accepted_submissions: 0,
            questions_solved: 0,
            accuracy: 0.0,
        }
    }

    /// Applies one submission event to the counters, in a fixed order so
    /// accuracy is always derived from up-to-date values:
    ///
    /// 1. every recorded submission counts towards the total;
    /// 2. accepted verdicts bump the accepted counter;
    /// 3. the first submission for a (user, question) pair bumps
    ///    questions_solved. Note the gate only looks at *prior* accepted
    ///    submissions for the pair, so a user's very first attempt at a
    ///    question counts as solved even when that attempt is rejected.
    ///    Kept as-is to match recorded production counters;
    /// 4. accuracy = accepted * 100 / total.
    pub fn record_submission(&mut self, accepted: bool, pair_solved_before: bool) {
        self.total_submissions += 1;

        if accepted {
            self.accepted_submissions += 1;
        }

        if !pair_solved_before {
            self.questions_solved += 1;
        }

        self.accuracy = self.accepted_submissions as f64 * 100.0 / self.total_submissions as f64;
    }
}

/// The field a leaderboard query sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardMetric {
    QuestionsSolved,
    AcceptedQuestions,
    TotalSubmissions,
    Accuracy,
}

impl LeaderboardMetric {
    /// Parses the path segment of the leaderboard route. Unrecognized
    /// names fall back to questions solved, matching the historic API.
    pub fn parse(s: &str) -> Self {
        match s {
            "questionsSolved" => Self::QuestionsSolved,
            "acceptedQuestions" => Self::AcceptedQuestions,
            "totalSubmissions" => Self::TotalSubmissions,
            "accuracy" => Self::Accuracy,
            _ => Self::QuestionsSolved,
        }
    }
}

/// A leaderboard row: the per-user counters joined with the display name.
/// Never persisted; rebuilt from user_stats on every query.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub name: String,
    pub questions_solved: i64,
    pub accepted_submissions: i64,
    pub total_submissions: i64,
    pub accuracy: f64,
}

/// Sorts the entries descending by the selected metric. The sort is stable,
/// so ties keep their input order. An empty input yields an empty board.
pub fn rank(mut entries: Vec<LeaderboardEntry>, metric: LeaderboardMetric) -> Vec<LeaderboardEntry> {
    match metric {
        LeaderboardMetric::QuestionsSolved => {
            entries.sort_by(|a, b| b.questions_solved.cmp(&a.questions_solved));
        }
        LeaderboardMetric::AcceptedQuestions => {
            entries.sort_by(|a, b| b.accepted_submissions.cmp(&a.accepted_submissions));
        }
        LeaderboardMetric::TotalSubmissions => {
            entries.sort_by(|a, b| b.total_submissions.cmp(&a.total_submissions));
        }
        LeaderboardMetric::Accuracy => {
            entries.sort_by(|a, b| {
                b.accuracy
                    .partial_cmp(&a.accuracy)
                    .unwrap_or(Ordering::Equal)
            });
        }
    }
    entries
}
