//! Tutoring session
//!
//! A session is a single tokio task that owns every piece of mutable state:
//! the conversation log, the editor contents, the turn machine, the feedback
//! engine and progression. Everything else talks to it through a cloneable
//! [`SessionHandle`].
//!
//! The actor never awaits while handling a command. Remote calls, timers and
//! delays run in spawned tasks that report back as commands carrying the
//! token of the operation they belong to, so late completions of abandoned
//! work are recognized and dropped.

mod actor;
pub mod feedback;
pub mod phrases;
pub mod progression;
pub mod turns;

use crate::critique::{CritiqueService, Verdict};
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::speech::SpeechSynthesis;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use vibe_common::config::FeedbackTuning;
use vibe_common::events::{EventBus, InteractionState};
use vibe_common::models::{Badge, ChallengeState, Lesson, Message};
use vibe_common::Catalog;

use turns::{PlaybackId, RecognitionId, TurnId};

/// Collaborators a session is built from
#[derive(Clone)]
pub struct SessionDeps {
    pub catalog: Arc<Catalog>,
    pub tuning: FeedbackTuning,
    pub critique: Arc<dyn CritiqueService>,
    pub speech: Arc<dyn SpeechSynthesis>,
    pub platform: Platform,
    pub events: EventBus,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: InteractionState,
    pub code: String,
    pub xp: u32,
    pub lesson: Lesson,
    pub lesson_index: usize,
    pub is_last_lesson: bool,
    pub badges: Vec<Badge>,
    pub challenge: ChallengeState,
    pub message_count: usize,
    pub analysis_pending: bool,
    pub tip_in_flight: bool,
    pub queued_announcements: usize,
}

#[derive(Debug)]
pub(crate) enum Command {
    // Requests from the outside
    Edit { code: String },
    RunCode,
    Chat { text: String },
    ToggleListening,
    RecognitionResult { session: RecognitionId, transcript: String },
    RecognitionEnded { session: RecognitionId },
    StopSpeaking,
    PlaybackEnded { playback: PlaybackId },
    AdvanceLesson,
    ToggleChallenge,
    Snapshot { reply: oneshot::Sender<SessionSnapshot> },
    Messages { reply: oneshot::Sender<Vec<Message>> },

    // Completions of work the actor spawned
    AnalysisDue { generation: u64 },
    TipSettled { reply: Option<String> },
    ChatReplied { turn: TurnId, reply: String, advance_from: Option<usize> },
    Validated { turn: TurnId, lesson_index: usize, verdict: Verdict },
    SpeechReady { turn: TurnId, text: String, audio: Option<Vec<u8>> },
    UnlockBadge { badge_id: String },
}

/// Cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::SessionClosed)
    }

    /// Report new editor contents
    pub fn edit(&self, code: impl Into<String>) -> Result<()> {
        self.send(Command::Edit { code: code.into() })
    }

    /// Validate the current code against the active lesson
    pub fn run_code(&self) -> Result<()> {
        self.send(Command::RunCode)
    }

    /// Typed chat message
    pub fn chat(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::Chat { text: text.into() })
    }

    pub fn toggle_listening(&self) -> Result<()> {
        self.send(Command::ToggleListening)
    }

    /// Recognizer produced a final transcript for `session`
    pub fn recognition_result(&self, session: RecognitionId, transcript: impl Into<String>) -> Result<()> {
        self.send(Command::RecognitionResult {
            session,
            transcript: transcript.into(),
        })
    }

    /// Recognizer session ended (with or without a result)
    pub fn recognition_ended(&self, session: RecognitionId) -> Result<()> {
        self.send(Command::RecognitionEnded { session })
    }

    pub fn stop_speaking(&self) -> Result<()> {
        self.send(Command::StopSpeaking)
    }

    /// Audio output finished playing `playback`
    pub fn playback_ended(&self, playback: PlaybackId) -> Result<()> {
        self.send(Command::PlaybackEnded { playback })
    }

    pub fn advance_lesson(&self) -> Result<()> {
        self.send(Command::AdvanceLesson)
    }

    pub fn toggle_challenge(&self) -> Result<()> {
        self.send(Command::ToggleChallenge)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| Error::SessionClosed)
    }

    /// Full conversation log, oldest first
    pub async fn messages(&self) -> Result<Vec<Message>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Messages { reply })?;
        rx.await.map_err(|_| Error::SessionClosed)
    }
}

/// Start a session actor on the current runtime
///
/// The session starts on the first catalog lesson with the welcome message
/// in its log. It stops once every handle is dropped and no spawned work is
/// still outstanding.
pub fn spawn_session(deps: SessionDeps) -> SessionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = actor::SessionActor::new(deps, tx.downgrade());
    tokio::spawn(actor.run(rx));
    SessionHandle { tx }
}
