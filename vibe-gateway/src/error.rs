//! Gateway error types
//!
//! The gateway keeps the flat `{"error": "..."}` body its callers expect.
//! Validation failures are the exception: they still answer with a verdict
//! shape so a client that only reads `passed`/`feedback` degrades cleanly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure talking to the upstream model provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream API key not configured")]
    MissingApiKey,

    #[error("Upstream request failed: {0}")]
    Network(String),

    #[error("Upstream returned {0}: {1}")]
    Status(u16, String),

    #[error("Unexpected upstream response: {0}")]
    Parse(String),

    #[error("Invalid upstream configuration: {0}")]
    Config(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Upstream call failed (500)
    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    /// Upstream produced no audio (500)
    #[error("TTS produced no audio")]
    EmptyAudio,

    /// Validation could not produce a verdict (500, verdict-shaped body)
    #[error("{0}")]
    Validation(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::EmptyAudio | ApiError::Validation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            ApiError::Validation(feedback) => json!({ "passed": false, "feedback": feedback }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
