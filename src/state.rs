use crate::config::Config;
use crate::feedback::FeedbackGenerator;
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub feedback: Arc<dyn FeedbackGenerator>,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn FeedbackGenerator> {
    fn from_ref(state: &AppState) -> Self {
        state.feedback.clone()
    }
}
