use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Live capture control
        .route("/listen/start", post(handlers::start_listening))
        .route("/listen/stop", post(handlers::stop_listening))
        .route("/listen/status", get(handlers::listening_status))
        .route("/listen/transcript", get(handlers::listening_transcript))
        // One-shot recognition
        .route("/recognize/file", post(handlers::recognize_file))
        .route("/recognize/video", post(handlers::recognize_video))
        // Text processing
        .route("/translate", post(handlers::translate))
        .route("/synthesize", post(handlers::synthesize))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
