//! Gateway critique client
//!
//! Talks to the gateway's `/api/chat` and `/api/validate` endpoints.

use super::{prompts, ChatTurn, CritiqueError, CritiqueService, Verdict};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vibe_common::models::Lesson;

const USER_AGENT: &str = concat!("code-vibe/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    messages: Vec<ChatTurn>,
    system_prompt: &'a str,
    current_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    text: String,
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    code: &'a str,
    lesson: &'a Lesson,
}

/// HTTP client for the critique endpoints
pub struct GatewayCritiqueClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GatewayCritiqueClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CritiqueError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CritiqueError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, CritiqueError>
    where
        B: Serialize + ?Sized + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling critique gateway");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CritiqueError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CritiqueError::Status(status.as_u16(), body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CritiqueError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CritiqueService for GatewayCritiqueClient {
    async fn try_chat(
        &self,
        history: &[ChatTurn],
        current_code: &str,
        user_prompt: &str,
    ) -> Result<String, CritiqueError> {
        let mut messages = history.to_vec();
        messages.push(ChatTurn::user(user_prompt));

        let request = ChatRequest {
            messages,
            system_prompt: prompts::SYSTEM_PROMPT,
            current_code,
        };
        let reply: ChatReply = self.post_json("/api/chat", &request).await?;
        Ok(reply.text)
    }

    async fn try_validate(&self, code: &str, lesson: &Lesson) -> Result<Verdict, CritiqueError> {
        self.post_json("/api/validate", &ValidateRequest { code, lesson })
            .await
    }
}
