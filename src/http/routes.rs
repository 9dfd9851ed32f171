use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle (create on POST, close on PUT)
        .route(
            "/live/session",
            post(handlers::create_session).put(handlers::close_session),
        )
        // Transcript entries
        .route("/live/message", post(handlers::append_message))
        // History queries
        .route("/live/sessions/user/:user_id", get(handlers::user_sessions))
        .route("/live/sessions/:session_id", get(handlers::session_detail))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
