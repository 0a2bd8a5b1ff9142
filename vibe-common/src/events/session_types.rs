//! Session-related type definitions
//!
//! Supporting types for the interaction state and local voice output.

use serde::{Deserialize, Serialize};

/// Conversational turn state
///
/// Exactly one value is active per session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionState {
    /// Nothing in progress
    #[default]
    Idle,
    /// Capturing the learner's voice
    Listening,
    /// Waiting on a remote chat, validation or speech call
    Processing,
    /// Playing synthesized mentor speech
    Speaking,
}

impl std::fmt::Display for InteractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionState::Idle => write!(f, "idle"),
            InteractionState::Listening => write!(f, "listening"),
            InteractionState::Processing => write!(f, "processing"),
            InteractionState::Speaking => write!(f, "speaking"),
        }
    }
}

/// Emotional color of locally synthesized speech
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Excited,
    Chill,
    Encouraging,
}

/// Voices tried in order when the platform offers them
const PREFERRED_VOICES: &[&str] = &["Google UK English Male", "Samantha", "Microsoft David"];

/// Parameters for the local speech synthesizer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceProfile {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Voice names to prefer, most preferred first
    pub preferred_voices: Vec<String>,
}

impl VoiceProfile {
    /// Neutral profile used for the natural-speech fallback
    pub fn natural() -> Self {
        Self::with(1.0, 1.0, 1.0, PREFERRED_VOICES)
    }

    /// Profile for short real-time hints
    pub fn for_emotion(emotion: Emotion) -> Self {
        // Hints skip the third fallback voice.
        let voices = &PREFERRED_VOICES[..2];
        match emotion {
            Emotion::Excited => Self::with(1.3, 1.2, 1.0, voices),
            Emotion::Chill => Self::with(0.9, 0.9, 0.8, voices),
            Emotion::Encouraging => Self::with(1.1, 1.1, 1.0, voices),
        }
    }

    fn with(rate: f32, pitch: f32, volume: f32, voices: &[&str]) -> Self {
        Self {
            rate,
            pitch,
            volume,
            preferred_voices: voices.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl From<Emotion> for VoiceProfile {
    fn from(emotion: Emotion) -> Self {
        Self::for_emotion(emotion)
    }
}
