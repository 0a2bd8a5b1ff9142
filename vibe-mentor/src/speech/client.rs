//! Gateway speech client (`GET /api/tts`)

use super::{SpeechError, SpeechSynthesis};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("code-vibe/", env!("CARGO_PKG_VERSION"));

pub struct GatewaySpeechClient {
    http_client: reqwest::Client,
    base_url: String,
    voice: Option<String>,
}

impl GatewaySpeechClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SpeechError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            voice: None,
        })
    }

    /// Ask the gateway for a specific voice instead of its default
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

#[async_trait]
impl SpeechSynthesis for GatewaySpeechClient {
    async fn try_synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let mut params = vec![("text", text)];
        if let Some(voice) = &self.voice {
            params.push(("voice", voice.as_str()));
        }

        tracing::debug!(chars = text.chars().count(), "Requesting speech synthesis");

        let response = self
            .http_client
            .get(format!("{}/api/tts", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status(status.as_u16(), body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Network(e.to_string()))?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(audio.to_vec())
    }
}
