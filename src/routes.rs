// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, leaderboard, questions, submissions, users},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

async fn home() -> &'static str {
    "Smart Interview Prep Platform is running!"
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, questions, submissions, leaderboard, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config, Feedback client).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new()
        .route("/me", get(users::get_me))
        .route("/{id}", get(users::get_user_by_id))
        .route("/email/{email}", get(users::get_user_by_email))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let question_routes = Router::new()
        .route("/", get(questions::list_questions))
        .route("/search", get(questions::search_questions))
        .route("/search/tag", get(questions::search_by_tag))
        .route("/{id}", get(questions::get_question))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let submission_routes = Router::new()
        .route("/", post(submissions::submit_code))
        .route("/user/{user_id}", get(submissions::list_by_user))
        .route("/question/{question_id}", get(submissions::list_by_question))
        .route(
            "/{id}",
            get(submissions::get_submission)
                .put(submissions::update_submission)
                .delete(submissions::delete_submission),
        )
        .route("/{id}/feedback", post(submissions::submission_feedback))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let leaderboard_routes = Router::new().route("/{metric}", get(leaderboard::get_leaderboard));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/questions", post(admin::create_question))
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(home))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/submissions", submission_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
