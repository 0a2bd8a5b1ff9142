//! HTTP request handlers

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::prompts;
use crate::upstream::{Completion, UpstreamMessage};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

const CHAT_TEMPERATURE: f32 = 1.0;
const CHAT_MAX_TOKENS: u32 = 150;
const VALIDATE_TEMPERATURE: f32 = 0.5;
const AUDIO_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "module": "vibe-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<UpstreamMessage>,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub current_code: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

/// POST /api/chat
///
/// The persona prompt and the learner's code become the system message;
/// the caller's messages follow unchanged.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(UpstreamMessage::system(prompts::with_code_context(
        &request.system_prompt,
        &request.current_code,
    )));
    messages.extend(request.messages);

    let reply = state
        .upstream
        .complete(Completion {
            messages,
            temperature: CHAT_TEMPERATURE,
            max_tokens: Some(CHAT_MAX_TOKENS),
            json_output: false,
        })
        .await
        .map_err(|e| {
            error!("Chat completion failed: {}", e);
            e
        })?;

    Ok(Json(ChatResponse {
        text: reply.unwrap_or_else(|| prompts::EMPTY_REPLY.to_string()),
    }))
}

/// The lesson fields the reviewer needs; anything else in the payload is ignored
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonBrief {
    pub objective: String,
    #[serde(default)]
    pub validation_criteria: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    pub lesson: LessonBrief,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    #[serde(default)]
    pub feedback: String,
}

/// POST /api/validate
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> ApiResult<Json<Verdict>> {
    let prompt = prompts::review(
        &request.lesson.objective,
        &request.lesson.validation_criteria,
        &request.code,
    );

    let content = state
        .upstream
        .complete(Completion {
            messages: vec![UpstreamMessage::user(prompt)],
            temperature: VALIDATE_TEMPERATURE,
            max_tokens: None,
            json_output: true,
        })
        .await
        .map_err(|e| {
            error!("Validation completion failed: {}", e);
            ApiError::Validation(prompts::VALIDATION_APOLOGY.to_string())
        })?
        .unwrap_or_else(|| "{}".to_string());

    let verdict: Verdict = serde_json::from_str(&content).map_err(|e| {
        warn!("Unparseable verdict {:?}: {}", content, e);
        ApiError::Validation(prompts::VALIDATION_APOLOGY.to_string())
    })?;

    Ok(Json(verdict))
}

#[derive(Debug, Deserialize)]
pub struct TtsParams {
    pub text: Option<String>,
    pub voice: Option<String>,
}

/// GET /api/tts?text=...&voice=...
pub async fn tts(
    State(state): State<AppState>,
    Query(params): Query<TtsParams>,
) -> ApiResult<impl IntoResponse> {
    let text = params
        .text
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Text is required".to_string()))?;
    let voice = params
        .voice
        .filter(|voice| !voice.is_empty())
        .unwrap_or_else(|| state.default_voice.clone());

    let audio = state.upstream.synthesize(&text, &voice).await.map_err(|e| {
        error!(voice = %voice, "Speech synthesis failed: {}", e);
        e
    })?;

    if audio.is_empty() {
        warn!(voice = %voice, "Speech synthesis returned no audio");
        return Err(ApiError::EmptyAudio);
    }

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CACHE_CONTROL, AUDIO_CACHE_CONTROL),
        ],
        audio,
    ))
}
