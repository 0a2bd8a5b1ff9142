//! Router setup

use super::handlers;
use crate::upstream::Upstream;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    /// Voice used when a TTS request does not name one
    pub default_voice: String,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat", post(handlers::chat))
        .route("/api/validate", post(handlers::validate))
        .route("/api/tts", get(handlers::tts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
