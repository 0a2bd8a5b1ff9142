//! Remote speech synthesis
//!
//! Audio comes back as encoded bytes; decoding and playback belong to the
//! platform audio output.

mod client;

pub use client::GatewaySpeechClient;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway error {0}: {1}")]
    Status(u16, String),

    #[error("Synthesis produced no audio")]
    EmptyAudio,
}

#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    async fn try_synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;

    /// Audio for `text`, or `None` when the caller should fall back to local
    /// synthesis
    async fn synthesize(&self, text: &str) -> Option<Vec<u8>> {
        match self.try_synthesize(text).await {
            Ok(audio) if !audio.is_empty() => Some(audio),
            Ok(_) => {
                warn!("Speech synthesis returned an empty body");
                None
            }
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed");
                None
            }
        }
    }
}
