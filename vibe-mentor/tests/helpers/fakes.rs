//! Scripted collaborators
//!
//! Every fake counts its calls. `FakeCritique` can be gated on a semaphore so
//! a test decides exactly when a remote request completes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use vibe_common::events::VoiceProfile;
use vibe_common::models::Lesson;
use vibe_mentor::critique::{ChatTurn, CritiqueError, CritiqueService, Verdict};
use vibe_mentor::platform::{AudioOutput, LocalSynthesizer, SpeechRecognizer};
use vibe_mentor::speech::{SpeechError, SpeechSynthesis};
use vibe_mentor::{Error, Result};

/// One recorded chat request
#[derive(Debug, Clone)]
pub struct ChatCall {
    pub history: Vec<ChatTurn>,
    pub code: String,
    pub prompt: String,
}

pub struct FakeCritique {
    chat_reply: Mutex<std::result::Result<String, String>>,
    verdict: Mutex<std::result::Result<Verdict, String>>,
    gate: Option<Arc<Semaphore>>,
    chat_calls: AtomicUsize,
    validate_calls: AtomicUsize,
    chat_log: Mutex<Vec<ChatCall>>,
    validated_lessons: Mutex<Vec<u32>>,
}

impl FakeCritique {
    pub fn new() -> Self {
        Self {
            chat_reply: Mutex::new(Ok("bet, we cooking".to_string())),
            verdict: Mutex::new(Ok(Verdict {
                passed: true,
                feedback: "Understood the assignment".to_string(),
            })),
            gate: None,
            chat_calls: AtomicUsize::new(0),
            validate_calls: AtomicUsize::new(0),
            chat_log: Mutex::new(Vec::new()),
            validated_lessons: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chat_reply(self, reply: &str) -> Self {
        self.set_chat_reply(reply);
        self
    }

    pub fn failing_chat(self) -> Self {
        *self.chat_reply.lock().unwrap() = Err("gateway down".to_string());
        self
    }

    pub fn with_verdict(self, passed: bool, feedback: &str) -> Self {
        self.set_verdict(passed, feedback);
        self
    }

    pub fn failing_validation(self) -> Self {
        *self.verdict.lock().unwrap() = Err("gateway down".to_string());
        self
    }

    /// Every request waits for one permit before answering
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_chat_reply(&self, reply: &str) {
        *self.chat_reply.lock().unwrap() = Ok(reply.to_string());
    }

    pub fn set_verdict(&self, passed: bool, feedback: &str) {
        *self.verdict.lock().unwrap() = Ok(Verdict {
            passed,
            feedback: feedback.to_string(),
        });
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn last_chat(&self) -> Option<ChatCall> {
        self.chat_log.lock().unwrap().last().cloned()
    }

    pub fn validated_lessons(&self) -> Vec<u32> {
        self.validated_lessons.lock().unwrap().clone()
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }
}

#[async_trait]
impl CritiqueService for FakeCritique {
    async fn try_chat(
        &self,
        history: &[ChatTurn],
        current_code: &str,
        user_prompt: &str,
    ) -> std::result::Result<String, CritiqueError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_log.lock().unwrap().push(ChatCall {
            history: history.to_vec(),
            code: current_code.to_string(),
            prompt: user_prompt.to_string(),
        });
        self.pass_gate().await;
        let reply = self.chat_reply.lock().unwrap().clone();
        reply.map_err(CritiqueError::Network)
    }

    async fn try_validate(
        &self,
        _code: &str,
        lesson: &Lesson,
    ) -> std::result::Result<Verdict, CritiqueError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validated_lessons.lock().unwrap().push(lesson.id);
        self.pass_gate().await;
        let verdict = self.verdict.lock().unwrap().clone();
        verdict.map_err(CritiqueError::Network)
    }
}

pub struct FakeSpeech {
    audio: Mutex<Option<Vec<u8>>>,
    calls: AtomicUsize,
}

impl FakeSpeech {
    /// Synthesis that always succeeds
    pub fn new() -> Self {
        Self {
            audio: Mutex::new(Some(b"ID3fake-mp3".to_vec())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Synthesis that always fails
    pub fn offline() -> Self {
        Self {
            audio: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesis for FakeSpeech {
    async fn try_synthesize(&self, _text: &str) -> std::result::Result<Vec<u8>, SpeechError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let audio = self.audio.lock().unwrap().clone();
        audio.ok_or_else(|| SpeechError::Network("offline".to_string()))
    }
}

/// Platform call as seen by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    StartRecognition(u64),
    StopRecognition(u64),
    SpeakLocally { text: String, profile: VoiceProfile },
    CancelLocalSpeech,
    Play(u64),
    StopAudio,
}

pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    recognition_available: AtomicBool,
    audio_fails: AtomicBool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            recognition_available: AtomicBool::new(true),
            audio_fails: AtomicBool::new(false),
        }
    }

    pub fn set_recognition_available(&self, available: bool) {
        self.recognition_available.store(available, Ordering::SeqCst);
    }

    pub fn set_audio_fails(&self, fails: bool) {
        self.audio_fails.store(fails, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Playback tokens handed to the audio output, in order
    pub fn playbacks(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::Play(playback) => Some(playback),
                _ => None,
            })
            .collect()
    }

    /// Recognition session tokens started, in order
    pub fn recognition_sessions(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::StartRecognition(session) => Some(session),
                _ => None,
            })
            .collect()
    }

    /// Local synthesis requests, in order
    pub fn spoken_locally(&self) -> Vec<(String, VoiceProfile)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::SpeakLocally { text, profile } => Some((text, profile)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SpeechRecognizer for RecordingPlatform {
    fn is_available(&self) -> bool {
        self.recognition_available.load(Ordering::SeqCst)
    }

    fn start(&self, session: u64) -> Result<()> {
        self.record(PlatformCall::StartRecognition(session));
        Ok(())
    }

    fn stop(&self, session: u64) {
        self.record(PlatformCall::StopRecognition(session));
    }
}

impl LocalSynthesizer for RecordingPlatform {
    fn speak(&self, text: &str, profile: VoiceProfile) {
        self.record(PlatformCall::SpeakLocally {
            text: text.to_string(),
            profile,
        });
    }

    fn cancel(&self) {
        self.record(PlatformCall::CancelLocalSpeech);
    }
}

impl AudioOutput for RecordingPlatform {
    fn play(&self, playback: u64, _audio: Vec<u8>) -> Result<()> {
        if self.audio_fails.load(Ordering::SeqCst) {
            return Err(Error::AudioOutput("device lost".to_string()));
        }
        self.record(PlatformCall::Play(playback));
        Ok(())
    }

    fn stop(&self) {
        self.record(PlatformCall::StopAudio);
    }
}
