//! HTTP request handlers

use super::server::AppContext;
use super::{ApiError, ApiResult};
use crate::session::SessionSnapshot;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vibe_common::catalog::leaderboard;
use vibe_common::models::{Badge, LeaderboardEntry, Lesson, Message, RoadmapStage};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesRequest {
    pub speech_recognition: bool,
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "vibe-mentor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Session state
// ============================================================================

/// GET /session
pub async fn get_session(State(ctx): State<AppContext>) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(ctx.session.snapshot().await?))
}

/// GET /session/messages
pub async fn get_messages(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(ctx.session.messages().await?))
}

// ============================================================================
// Catalog
// ============================================================================

/// GET /catalog/lessons
pub async fn get_lessons(State(ctx): State<AppContext>) -> Json<Vec<Lesson>> {
    Json(ctx.catalog.lessons.clone())
}

/// GET /catalog/badges
///
/// Unlock flags reflect the live session, not the catalog defaults.
pub async fn get_badges(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<Badge>>> {
    Ok(Json(ctx.session.snapshot().await?.badges))
}

/// GET /catalog/roadmap
pub async fn get_roadmap(State(ctx): State<AppContext>) -> Json<Vec<RoadmapStage>> {
    Json(ctx.catalog.roadmap.clone())
}

/// GET /leaderboard
pub async fn get_leaderboard(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let xp = ctx.session.snapshot().await?.xp;
    Ok(Json(leaderboard(xp)))
}

// ============================================================================
// Learner actions
// ============================================================================

/// POST /code - editor contents changed
pub async fn update_code(
    State(ctx): State<AppContext>,
    Json(req): Json<CodeRequest>,
) -> ApiResult<StatusCode> {
    ctx.session.edit(req.code)?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /code/run
pub async fn run_code(State(ctx): State<AppContext>) -> ApiResult<StatusCode> {
    ctx.session.run_code()?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /chat - typed message
pub async fn chat(
    State(ctx): State<AppContext>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<StatusCode> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }
    ctx.session.chat(req.text)?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /lesson/advance
pub async fn advance_lesson(State(ctx): State<AppContext>) -> ApiResult<StatusCode> {
    ctx.session.advance_lesson()?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /challenge/toggle
pub async fn toggle_challenge(State(ctx): State<AppContext>) -> ApiResult<StatusCode> {
    ctx.session.toggle_challenge()?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /voice/toggle
pub async fn toggle_voice(State(ctx): State<AppContext>) -> ApiResult<StatusCode> {
    ctx.session.toggle_listening()?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /speech/stop
pub async fn stop_speaking(State(ctx): State<AppContext>) -> ApiResult<StatusCode> {
    ctx.session.stop_speaking()?;
    Ok(StatusCode::ACCEPTED)
}

// ============================================================================
// Platform callbacks
// ============================================================================

/// POST /voice/:session/result
pub async fn recognition_result(
    State(ctx): State<AppContext>,
    Path(session): Path<u64>,
    Json(req): Json<TranscriptRequest>,
) -> ApiResult<StatusCode> {
    debug!(session, "Recognition result received");
    ctx.session.recognition_result(session, req.transcript)?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /voice/:session/ended
pub async fn recognition_ended(
    State(ctx): State<AppContext>,
    Path(session): Path<u64>,
) -> ApiResult<StatusCode> {
    ctx.session.recognition_ended(session)?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /speech/:playback/ended
pub async fn playback_ended(
    State(ctx): State<AppContext>,
    Path(playback): Path<u64>,
) -> ApiResult<StatusCode> {
    ctx.session.playback_ended(playback)?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /platform/capabilities - what the connected browser supports
pub async fn report_capabilities(
    State(ctx): State<AppContext>,
    Json(req): Json<CapabilitiesRequest>,
) -> StatusCode {
    ctx.bridge.set_recognition_available(req.speech_recognition);
    StatusCode::NO_CONTENT
}
