//! Upstream model provider
//!
//! [`GroqClient`] speaks the OpenAI-compatible chat completions and audio
//! speech endpoints. Every call waits on a shared token bucket first.

use crate::error::UpstreamError;
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use tracing::debug;
use vibe_common::config::GatewayConfig;

const USER_AGENT: &str = concat!("code-vibe-gateway/", env!("CARGO_PKG_VERSION"));

/// One chat message forwarded upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    pub role: String,
    pub content: String,
}

impl UpstreamMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat completion request, independent of the model name
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub messages: Vec<UpstreamMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Ask the model for a JSON object
    pub json_output: bool,
}

/// What the gateway needs from a model provider
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Returns the first choice's content, `None` when the model said nothing
    async fn complete(&self, request: Completion) -> Result<Option<String>, UpstreamError>;

    /// Synthesize `text` with `voice`, returning encoded audio
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, UpstreamError>;
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [UpstreamMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

/// reqwest client for an OpenAI-compatible provider (Groq by default)
pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    speech_model: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl GroqClient {
    pub fn new(config: &GatewayConfig, api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let per_minute = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            UpstreamError::Config("requests_per_minute must be greater than 0".to_string())
        })?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            chat_model: config.chat_model.clone(),
            speech_model: config.speech_model.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        })
    }

    /// Whether an API key was supplied
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<reqwest::Response, UpstreamError> {
        if !self.is_configured() {
            return Err(UpstreamError::MissingApiKey);
        }

        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Calling upstream");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status(status.as_u16(), body));
        }
        Ok(response)
    }
}

#[async_trait]
impl Upstream for GroqClient {
    async fn complete(&self, request: Completion) -> Result<Option<String>, UpstreamError> {
        let body = ChatCompletionBody {
            model: &self.chat_model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_output.then_some(ResponseFormat { kind: "json_object" }),
        };

        let response: ChatCompletionResponse = self
            .post("/chat/completions", &body)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty()))
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, UpstreamError> {
        let body = SpeechBody {
            model: &self.speech_model,
            input: text,
            voice,
            response_format: "mp3",
        };

        let bytes = self
            .post("/audio/speech", &body)
            .await?
            .bytes()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
