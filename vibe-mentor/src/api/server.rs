//! Router setup

use crate::platform::BrowserBridge;
use crate::session::SessionHandle;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vibe_common::events::EventBus;
use vibe_common::Catalog;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub session: SessionHandle,
    pub catalog: Arc<Catalog>,
    pub events: EventBus,
    pub bridge: Arc<BrowserBridge>,
}

/// Build the mentor router
pub fn build_router(ctx: AppContext) -> Router {
    use super::handlers;

    Router::new()
        .route("/health", get(handlers::health))
        // Session state
        .route("/session", get(handlers::get_session))
        .route("/session/messages", get(handlers::get_messages))
        // Read-only catalog
        .route("/catalog/lessons", get(handlers::get_lessons))
        .route("/catalog/badges", get(handlers::get_badges))
        .route("/catalog/roadmap", get(handlers::get_roadmap))
        .route("/leaderboard", get(handlers::get_leaderboard))
        // Learner actions
        .route("/code", post(handlers::update_code))
        .route("/code/run", post(handlers::run_code))
        .route("/chat", post(handlers::chat))
        .route("/lesson/advance", post(handlers::advance_lesson))
        .route("/challenge/toggle", post(handlers::toggle_challenge))
        .route("/voice/toggle", post(handlers::toggle_voice))
        .route("/speech/stop", post(handlers::stop_speaking))
        // Platform callbacks
        .route("/voice/:session/result", post(handlers::recognition_result))
        .route("/voice/:session/ended", post(handlers::recognition_ended))
        .route("/speech/:playback/ended", post(handlers::playback_ended))
        .route("/platform/capabilities", post(handlers::report_capabilities))
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
