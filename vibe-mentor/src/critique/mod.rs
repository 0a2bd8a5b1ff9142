//! Remote critique service
//!
//! Conversational replies, proactive tips and code validation come from the
//! gateway. Callers on the session path use the infallible methods; the
//! feedback engine uses `try_chat` so a failure reads as "no issue".

mod client;
pub mod prompts;

pub use client::GatewayCritiqueClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use vibe_common::models::{Lesson, Message, Role};

/// Critique client errors
#[derive(Debug, Error)]
pub enum CritiqueError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Speaker of a chat turn on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior turn of conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::User => ChatRole::User,
            Role::Ai => ChatRole::Assistant,
        };
        Self {
            role,
            content: message.text.clone(),
        }
    }
}

/// Validation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    #[serde(default)]
    pub feedback: String,
}

impl Verdict {
    /// Failed verdict carrying the canned apology
    pub fn apology() -> Self {
        Self {
            passed: false,
            feedback: prompts::VALIDATE_APOLOGY.to_string(),
        }
    }
}

#[async_trait]
pub trait CritiqueService: Send + Sync {
    /// Chat reply for `user_prompt`, given prior turns and the current code
    async fn try_chat(
        &self,
        history: &[ChatTurn],
        current_code: &str,
        user_prompt: &str,
    ) -> Result<String, CritiqueError>;

    /// Judge `code` against the lesson objective and criteria
    async fn try_validate(&self, code: &str, lesson: &Lesson) -> Result<Verdict, CritiqueError>;

    /// Chat reply, or the connection apology on any failure
    async fn chat_respond(&self, history: &[ChatTurn], current_code: &str, user_prompt: &str) -> String {
        match self.try_chat(history, current_code, user_prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                prompts::CHAT_APOLOGY.to_string()
            }
        }
    }

    /// Verdict, or a failed verdict with the apology on any failure
    async fn validate_code(&self, code: &str, lesson: &Lesson) -> Verdict {
        match self.try_validate(code, lesson).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, lesson_id = lesson.id, "Validation request failed");
                Verdict::apology()
            }
        }
    }
}
