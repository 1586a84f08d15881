//! Axum router construction for the rewards API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin frontend access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the rewards server.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Points
        .route("/api/points", post(handlers::record_points))
        .route(
            "/api/points/{user_id}/summary",
            get(handlers::get_summary),
        )
        // XP
        .route("/api/xp", post(handlers::grant_xp))
        .route("/api/xp/{user_id}", get(handlers::get_xp_state))
        // Streaks
        .route("/api/streak", post(handlers::touch_streak))
        .route("/api/streak/{user_id}", get(handlers::get_streak))
        // Achievements
        .route("/api/achievements", get(handlers::list_achievements))
        .route(
            "/api/achievements/{user_id}",
            get(handlers::get_user_achievements),
        )
        .route(
            "/api/achievements/{user_id}/check",
            post(handlers::check_and_award),
        )
        // Daily challenge
        .route("/api/challenge/today", get(handlers::get_today_challenge))
        .route(
            "/api/challenge/submit",
            post(handlers::submit_challenge_answer),
        )
        .route(
            "/api/challenge/today/{user_id}/completed",
            get(handlers::has_completed_today),
        )
        // Modules and completions
        .route(
            "/api/modules/{module_id}/check",
            post(handlers::check_module_completion),
        )
        .route(
            "/api/completions/exercise",
            post(handlers::record_exercise_completion),
        )
        .route(
            "/api/completions/lesson",
            post(handlers::record_lesson_completion),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
