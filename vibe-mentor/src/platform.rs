//! Platform collaborators
//!
//! Speech recognition, local speech synthesis and audio output live in the
//! presentation layer. The session talks to them through these traits;
//! [`BrowserBridge`] implements all three by publishing platform commands on
//! the event bus, and the presentation layer reports lifecycle callbacks back
//! over HTTP.

use crate::error::{Error, Result};
use base64::Engine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vibe_common::events::{EventBus, TutorEvent, VoiceProfile};

/// Single-utterance speech recognizer
///
/// Results and end-of-session notifications arrive asynchronously through
/// the session handle, tagged with the session token passed to `start`.
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;
    fn start(&self, session: u64) -> Result<()>;
    fn stop(&self, session: u64);
}

/// Fire-and-forget local synthesis
///
/// Successive `speak` calls queue and are spoken in order; `cancel` clears
/// the queue.
pub trait LocalSynthesizer: Send + Sync {
    fn speak(&self, text: &str, profile: VoiceProfile);
    fn cancel(&self);
}

/// Playback of synthesized audio
///
/// Natural completion is reported through the session handle with the
/// playback token passed to `play`.
pub trait AudioOutput: Send + Sync {
    fn play(&self, playback: u64, audio: Vec<u8>) -> Result<()>;
    fn stop(&self);
}

/// Bundle of platform collaborators handed to a session
#[derive(Clone)]
pub struct Platform {
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn LocalSynthesizer>,
    pub audio: Arc<dyn AudioOutput>,
}

/// Platform adapter that drives a browser presentation layer over SSE
pub struct BrowserBridge {
    events: EventBus,
    recognition_available: AtomicBool,
    lang: String,
}

impl BrowserBridge {
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            recognition_available: AtomicBool::new(false),
            lang: "en-US".to_string(),
        }
    }

    /// Record whether the connected browser offers speech recognition
    pub fn set_recognition_available(&self, available: bool) {
        self.recognition_available.store(available, Ordering::Relaxed);
        tracing::info!(available, "Presentation layer reported recognition support");
    }

    /// Share this bridge as every platform collaborator
    pub fn platform(self: &Arc<Self>) -> Platform {
        Platform {
            recognizer: self.clone(),
            synthesizer: self.clone(),
            audio: self.clone(),
        }
    }

    /// Publish a command that needs somebody listening
    fn command(&self, event: TutorEvent, capability: &str) -> Result<()> {
        self.events
            .emit(event)
            .map(|_| ())
            .map_err(|_| Error::Capability(format!("no presentation client connected for {capability}")))
    }
}

impl SpeechRecognizer for BrowserBridge {
    fn is_available(&self) -> bool {
        self.recognition_available.load(Ordering::Relaxed)
    }

    fn start(&self, session: u64) -> Result<()> {
        self.command(
            TutorEvent::StartRecognition {
                session,
                lang: self.lang.clone(),
            },
            "speech recognition",
        )
    }

    fn stop(&self, session: u64) {
        self.events.emit_lossy(TutorEvent::StopRecognition { session });
    }
}

impl LocalSynthesizer for BrowserBridge {
    fn speak(&self, text: &str, profile: VoiceProfile) {
        self.events.emit_lossy(TutorEvent::SpeakLocally {
            text: text.to_string(),
            profile,
        });
    }

    fn cancel(&self) {
        self.events.emit_lossy(TutorEvent::CancelLocalSpeech);
    }
}

impl AudioOutput for BrowserBridge {
    fn play(&self, playback: u64, audio: Vec<u8>) -> Result<()> {
        if audio.is_empty() {
            return Err(Error::AudioOutput("empty audio buffer".to_string()));
        }
        let audio = base64::engine::general_purpose::STANDARD.encode(audio);
        self.command(TutorEvent::PlayAudio { playback, audio }, "audio output")
    }

    fn stop(&self) {
        self.events.emit_lossy(TutorEvent::StopAudio);
    }
}
