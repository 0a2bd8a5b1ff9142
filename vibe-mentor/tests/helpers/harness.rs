//! Session harness
//!
//! Polling helpers only yield to the scheduler; they never sleep. Under
//! `start_paused` the clock therefore moves only when a test sleeps.

use super::fakes::{FakeCritique, FakeSpeech, RecordingPlatform};
use std::sync::Arc;
use tokio::sync::broadcast;
use vibe_common::config::FeedbackTuning;
use vibe_common::events::{EventBus, InteractionState, TutorEvent};
use vibe_common::models::{Message, Role};
use vibe_common::Catalog;
use vibe_mentor::platform::Platform;
use vibe_mentor::{spawn_session, SessionDeps, SessionHandle, SessionSnapshot};

pub struct TestSession {
    pub handle: SessionHandle,
    pub critique: Arc<FakeCritique>,
    pub speech: Arc<FakeSpeech>,
    pub platform: Arc<RecordingPlatform>,
    pub events: broadcast::Receiver<TutorEvent>,
}

impl TestSession {
    pub fn start() -> Self {
        Self::with(FakeCritique::new(), FakeSpeech::new())
    }

    pub fn with(critique: FakeCritique, speech: FakeSpeech) -> Self {
        let critique = Arc::new(critique);
        let speech = Arc::new(speech);
        let platform = Arc::new(RecordingPlatform::new());
        let bus = EventBus::new(256);
        let events = bus.subscribe();

        let handle = spawn_session(SessionDeps {
            catalog: Arc::new(Catalog::builtin()),
            tuning: FeedbackTuning::default(),
            critique: critique.clone(),
            speech: speech.clone(),
            platform: Platform {
                recognizer: platform.clone(),
                synthesizer: platform.clone(),
                audio: platform.clone(),
            },
            events: bus,
        });

        Self {
            handle,
            critique,
            speech,
            platform,
            events,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.handle.snapshot().await.expect("session alive")
    }

    /// Poll until `pred` holds, panicking after a bounded number of rounds
    pub async fn wait_for(&self, what: &str, pred: impl Fn(&SessionSnapshot) -> bool) -> SessionSnapshot {
        let mut last = self.snapshot().await;
        for _ in 0..200 {
            if pred(&last) {
                return last;
            }
            tokio::task::yield_now().await;
            last = self.snapshot().await;
        }
        panic!("timed out waiting for {what}: {last:?}");
    }

    pub async fn wait_for_state(&self, state: InteractionState) -> SessionSnapshot {
        self.wait_for(&format!("state {state}"), |s| s.state == state).await
    }

    /// Let spawned work run to quiescence without moving the clock
    pub async fn settle(&self) {
        for _ in 0..50 {
            tokio::task::yield_now().await;
            let _ = self.snapshot().await;
        }
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.handle.messages().await.expect("session alive")
    }

    pub async fn ai_lines(&self) -> Vec<String> {
        self.messages()
            .await
            .into_iter()
            .filter(|m| m.role == Role::Ai)
            .map(|m| m.text)
            .collect()
    }

    pub async fn last_text(&self) -> String {
        self.messages()
            .await
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default()
    }

    /// Drain every event published so far
    pub fn drain_events(&mut self) -> Vec<TutorEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}
