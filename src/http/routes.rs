use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Capture control
        .route("/capture/start", post(handlers::start_capture))
        .route("/capture/stop", post(handlers::stop_capture))
        // Capture queries
        .route("/capture/status", get(handlers::get_status))
        .route("/capture/replay", get(handlers::get_replay))
        .route("/capture/events", get(handlers::capture_events))
        // Record-then-upload path. The default axum body limit (2 MB) is
        // far below a full recording, so this route takes its own limit.
        .route(
            "/capture/analyze",
            post(handlers::analyze_recording).layer(DefaultBodyLimit::max(state.upload_limit)),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
