//! Event types for the Code Vibe event system
//!
//! Provides the shared event definitions and the EventBus used by the mentor
//! session and its SSE stream.

mod session_types;

pub use session_types::{Emotion, InteractionState, VoiceProfile};

use crate::models::{ChallengeState, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Code Vibe event types
///
/// Two families share this enum:
/// - state notifications for the presentation layer (messages, xp, badges,
///   interaction state)
/// - platform commands, which ask the presentation layer to start or stop
///   recognition, play audio, or speak locally
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TutorEvent {
    /// A message was appended to the conversation log
    MessageAppended {
        message: Message,
    },

    /// Interaction state changed
    InteractionStateChanged {
        old_state: InteractionState,
        new_state: InteractionState,
        timestamp: DateTime<Utc>,
    },

    /// Editor contents replaced by the session (lesson advance)
    CodeReplaced {
        code: String,
        timestamp: DateTime<Utc>,
    },

    /// Active lesson changed
    LessonChanged {
        lesson_id: u32,
        title: String,
        objective: String,
        timestamp: DateTime<Utc>,
    },

    /// Experience points awarded
    XpAwarded {
        earned: u32,
        total: u32,
        timestamp: DateTime<Utc>,
    },

    /// Passed validation; the presentation layer shows its celebration effect
    Celebrate {
        timestamp: DateTime<Utc>,
    },

    /// Badge unlocked for the first time
    BadgeUnlocked {
        badge_id: String,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Challenge mode counters changed
    ChallengeChanged {
        state: ChallengeState,
        timestamp: DateTime<Utc>,
    },

    /// A requested capability is not offered by the platform
    CapabilityMissing {
        capability: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Platform command: begin a single-utterance recognition session
    StartRecognition {
        session: u64,
        lang: String,
    },

    /// Platform command: stop a recognition session
    StopRecognition {
        session: u64,
    },

    /// Platform command: decode and play synthesized speech
    PlayAudio {
        playback: u64,
        /// Base64 encoded audio bytes
        audio: String,
    },

    /// Platform command: tear down audio output
    StopAudio,

    /// Platform command: speak text with the local synthesizer
    SpeakLocally {
        text: String,
        profile: VoiceProfile,
    },

    /// Platform command: cancel local synthesis
    CancelLocalSpeech,
}

impl TutorEvent {
    /// Event type name used as the SSE `event` field
    pub fn event_type(&self) -> &'static str {
        match self {
            TutorEvent::MessageAppended { .. } => "MessageAppended",
            TutorEvent::InteractionStateChanged { .. } => "InteractionStateChanged",
            TutorEvent::CodeReplaced { .. } => "CodeReplaced",
            TutorEvent::LessonChanged { .. } => "LessonChanged",
            TutorEvent::XpAwarded { .. } => "XpAwarded",
            TutorEvent::Celebrate { .. } => "Celebrate",
            TutorEvent::BadgeUnlocked { .. } => "BadgeUnlocked",
            TutorEvent::ChallengeChanged { .. } => "ChallengeChanged",
            TutorEvent::CapabilityMissing { .. } => "CapabilityMissing",
            TutorEvent::StartRecognition { .. } => "StartRecognition",
            TutorEvent::StopRecognition { .. } => "StopRecognition",
            TutorEvent::PlayAudio { .. } => "PlayAudio",
            TutorEvent::StopAudio => "StopAudio",
            TutorEvent::SpeakLocally { .. } => "SpeakLocally",
            TutorEvent::CancelLocalSpeech => "CancelLocalSpeech",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`:
/// - publishing never blocks on slow subscribers
/// - any number of concurrent subscribers
/// - lagging subscribers are told how many events they missed
///
/// # Examples
///
/// ```
/// use vibe_common::events::{EventBus, TutorEvent};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(TutorEvent::StopAudio);
/// assert!(matches!(rx.try_recv(), Ok(TutorEvent::StopAudio)));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TutorEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<TutorEvent> {
        self.tx.subscribe()
    }

    /// Publish an event
    ///
    /// Returns the number of subscribers that received it, or an error when
    /// nobody is subscribed.
    pub fn emit(
        &self,
        event: TutorEvent,
    ) -> Result<usize, broadcast::error::SendError<TutorEvent>> {
        self.tx.send(event)
    }

    /// Publish an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: TutorEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::trace!("No subscribers for event: {}", e.0.event_type());
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
