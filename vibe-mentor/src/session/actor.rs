//! Session actor: command dispatch and the flows built on it

use super::feedback::{Analysis, FeedbackEngine};
use super::phrases;
use super::progression::{Advance, ChallengeOutcome, Progression};
use super::turns::{Interrupted, PlaybackId, RecognitionId, TurnId, TurnMachine};
use super::{Command, SessionDeps, SessionSnapshot};
use crate::critique::{prompts, ChatTurn, CritiqueService, Verdict};
use crate::platform::Platform;
use crate::speech::SpeechSynthesis;
use chrono::Utc;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vibe_common::events::{Emotion, EventBus, InteractionState, TutorEvent, VoiceProfile};
use vibe_common::models::{Message, Role};

/// Sends `TipSettled` when dropped, whether the tip task finished or not
struct SettleOnDrop {
    tx: Option<mpsc::UnboundedSender<Command>>,
    reply: Option<String>,
}

impl SettleOnDrop {
    fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            tx: Some(tx),
            reply: None,
        }
    }
}

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Command::TipSettled {
                reply: self.reply.take(),
            });
        }
    }
}

pub(crate) struct SessionActor {
    critique: Arc<dyn CritiqueService>,
    speech: Arc<dyn SpeechSynthesis>,
    platform: Platform,
    events: EventBus,
    tx: mpsc::WeakUnboundedSender<Command>,

    turns: TurnMachine,
    feedback: FeedbackEngine,
    progression: Progression,
    code: String,
    messages: Vec<Message>,
    announcements: VecDeque<String>,

    history_window: usize,
    badge_delay: Duration,
}

impl SessionActor {
    pub(crate) fn new(deps: SessionDeps, tx: mpsc::WeakUnboundedSender<Command>) -> Self {
        let progression = Progression::new(deps.catalog);
        let code = progression.current_lesson().initial_code.clone();
        let feedback = FeedbackEngine::new(&deps.tuning, &code);

        Self {
            critique: deps.critique,
            speech: deps.speech,
            platform: deps.platform,
            events: deps.events,
            tx,
            turns: TurnMachine::new(),
            feedback,
            progression,
            code,
            messages: vec![Message::new(Role::Ai, phrases::WELCOME)],
            announcements: VecDeque::new(),
            history_window: deps.tuning.history_window,
            badge_delay: deps.tuning.badge_delay(),
        }
    }

    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!(
            lesson_id = self.progression.current_lesson().id,
            "Session started"
        );
        while let Some(command) = rx.recv().await {
            self.dispatch(command);
        }
        self.feedback.cancel_pending();
        info!("Session stopped");
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Edit { code } => self.on_edit(code),
            Command::RunCode => self.on_run_code(),
            Command::Chat { text } => self.on_chat(text),
            Command::ToggleListening => self.on_toggle_listening(),
            Command::RecognitionResult { session, transcript } => {
                self.on_recognition_result(session, transcript)
            }
            Command::RecognitionEnded { session } => self.on_recognition_ended(session),
            Command::StopSpeaking => self.stop_speaking(),
            Command::PlaybackEnded { playback } => self.on_playback_ended(playback),
            Command::AdvanceLesson => self.advance_lesson(),
            Command::ToggleChallenge => {
                let state = self.progression.toggle_challenge();
                info!(enabled = state.enabled, "Challenge mode toggled");
                self.emit_challenge();
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Messages { reply } => {
                let _ = reply.send(self.messages.clone());
            }
            Command::AnalysisDue { generation } => self.on_analysis_due(generation),
            Command::TipSettled { reply } => self.on_tip_settled(reply),
            Command::ChatReplied {
                turn,
                reply,
                advance_from,
            } => self.on_chat_replied(turn, reply, advance_from),
            Command::Validated {
                turn,
                lesson_index,
                verdict,
            } => self.on_validated(turn, lesson_index, verdict),
            Command::SpeechReady { turn, text, audio } => self.on_speech_ready(turn, text, audio),
            Command::UnlockBadge { badge_id } => self.on_unlock_badge(&badge_id),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.turns.state(),
            code: self.code.clone(),
            xp: self.progression.xp(),
            lesson: self.progression.current_lesson().clone(),
            lesson_index: self.progression.lesson_index(),
            is_last_lesson: self.progression.is_last_lesson(),
            badges: self.progression.badges().to_vec(),
            challenge: self.progression.challenge(),
            message_count: self.messages.len(),
            analysis_pending: self.feedback.has_pending(),
            tip_in_flight: self.feedback.tip_in_flight(),
            queued_announcements: self.announcements.len(),
        }
    }

    // ========================================
    // Plumbing
    // ========================================

    /// Run `work` off the actor and feed its result back as a command
    fn report<F>(&self, work: F)
    where
        F: Future<Output = Command> + Send + 'static,
    {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            let command = work.await;
            let _ = tx.send(command);
        });
    }

    fn append(&mut self, role: Role, text: impl Into<String>) {
        let message = Message::new(role, text);
        self.events.emit_lossy(TutorEvent::MessageAppended {
            message: message.clone(),
        });
        self.messages.push(message);
    }

    fn emit_challenge(&self) {
        self.events.emit_lossy(TutorEvent::ChallengeChanged {
            state: self.progression.challenge(),
            timestamp: Utc::now(),
        });
    }

    /// Apply a turn machine operation, publishing any state change
    ///
    /// Returning to idle releases the next queued announcement.
    fn transition<R>(&mut self, op: impl FnOnce(&mut TurnMachine) -> R) -> R {
        let old_state = self.turns.state();
        let result = op(&mut self.turns);
        let new_state = self.turns.state();

        if old_state != new_state {
            debug!(%old_state, %new_state, "Interaction state changed");
            self.events.emit_lossy(TutorEvent::InteractionStateChanged {
                old_state,
                new_state,
                timestamp: Utc::now(),
            });
            if new_state == InteractionState::Idle {
                self.drain_announcements();
            }
        }
        result
    }

    // ========================================
    // Speech pipeline
    // ========================================

    /// Synthesize `text` for `turn`; the result comes back as `SpeechReady`
    fn speak(&self, turn: TurnId, text: String) {
        let speech = self.speech.clone();
        self.report(async move {
            let audio = speech.synthesize(&text).await;
            Command::SpeechReady { turn, text, audio }
        });
    }

    /// Speak for `turn` unless it has been superseded
    fn speak_if_current(&self, turn: TurnId, text: String) {
        if self.turns.is_processing(turn) {
            self.speak(turn, text);
        } else {
            debug!(turn, "Turn superseded, not speaking its reply");
        }
    }

    fn on_speech_ready(&mut self, turn: TurnId, text: String, audio: Option<Vec<u8>>) {
        if !self.turns.is_processing(turn) {
            debug!(turn, "Discarding speech for a superseded turn");
            return;
        }

        let Some(audio) = audio else {
            self.finish_locally(&text, VoiceProfile::natural(), |turns| turns.settle(turn));
            return;
        };

        let Some(playback) = self.transition(|turns| turns.begin_speaking(turn)) else {
            return;
        };
        if let Err(e) = self.platform.audio.play(playback, audio) {
            warn!(error = %e, playback, "Audio output failed, speaking locally");
            self.finish_locally(&text, VoiceProfile::natural(), |turns| {
                turns.finish_playback(playback)
            });
        }
    }

    /// End the active turn on the local voice
    ///
    /// Local synthesis reports no completion, so announcements queued behind
    /// the turn are handed to the same voice, which speaks them in order,
    /// instead of starting natural playback on top of it.
    fn finish_locally(
        &mut self,
        text: &str,
        profile: VoiceProfile,
        end: impl FnOnce(&mut TurnMachine) -> bool,
    ) {
        self.platform.synthesizer.speak(text, profile);
        for queued in self.announcements.drain(..) {
            self.platform.synthesizer.speak(&queued, VoiceProfile::natural());
        }
        self.transition(end);
    }

    /// Voice unsolicited feedback only when nothing else owns the audio
    fn speak_if_idle(&self, text: &str, profile: VoiceProfile) {
        if self.turns.is_idle() {
            self.platform.synthesizer.speak(text, profile);
        } else {
            debug!(state = %self.turns.state(), "Session busy, feedback not voiced");
        }
    }

    fn on_playback_ended(&mut self, playback: PlaybackId) {
        if !self.transition(|turns| turns.finish_playback(playback)) {
            debug!(playback, "Ignoring end of stale playback");
        }
    }

    /// Append and voice an AI announcement without overlapping other speech
    fn announce(&mut self, text: String) {
        self.append(Role::Ai, text.clone());
        self.voice(text);
    }

    fn voice(&mut self, text: String) {
        if !self.turns.is_idle() {
            debug!(queued = self.announcements.len() + 1, "Queueing announcement");
            self.announcements.push_back(text);
            return;
        }
        match self.transition(TurnMachine::begin_turn) {
            Ok(turn) => self.speak(turn, text),
            Err(e) => {
                debug!(error = %e, "Queueing announcement");
                self.announcements.push_back(text);
            }
        }
    }

    fn drain_announcements(&mut self) {
        if let Some(text) = self.announcements.pop_front() {
            self.voice(text);
        }
    }

    fn stop_speaking(&mut self) {
        self.announcements.clear();
        self.platform.audio.stop();
        self.platform.synthesizer.cancel();

        match self.transition(TurnMachine::interrupt) {
            Interrupted::Nothing => debug!("Stop requested with nothing to stop"),
            Interrupted::Turn(turn) => info!(turn, "Abandoned AI turn"),
            Interrupted::Playback(playback) => info!(playback, "Stopped playback"),
        }
    }

    // ========================================
    // Voice capture
    // ========================================

    fn on_toggle_listening(&mut self) {
        match self.turns.state() {
            InteractionState::Listening => {
                if let Some(session) = self.turns.active_recognition() {
                    self.platform.recognizer.stop(session);
                    self.transition(|turns| turns.end_listening(session));
                }
            }
            InteractionState::Processing => {
                warn!("Ignoring voice toggle while a turn is processing");
            }
            InteractionState::Idle | InteractionState::Speaking => self.start_listening(),
        }
    }

    fn start_listening(&mut self) {
        if !self.platform.recognizer.is_available() {
            self.capability_missing("speech_recognition", phrases::VOICE_UNSUPPORTED.to_string());
            return;
        }

        if self.turns.state() == InteractionState::Speaking {
            self.stop_speaking();
        } else {
            self.platform.synthesizer.cancel();
        }

        let session = match self.transition(TurnMachine::begin_listening) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Cannot start listening");
                return;
            }
        };

        if let Err(e) = self.platform.recognizer.start(session) {
            warn!(error = %e, session, "Recognizer failed to start");
            self.transition(|turns| turns.end_listening(session));
            self.capability_missing("speech_recognition", e.to_string());
        }
    }

    fn capability_missing(&self, capability: &str, message: String) {
        self.events.emit_lossy(TutorEvent::CapabilityMissing {
            capability: capability.to_string(),
            message,
            timestamp: Utc::now(),
        });
    }

    fn on_recognition_result(&mut self, session: RecognitionId, transcript: String) {
        if self.turns.active_recognition() != Some(session) {
            debug!(session, "Ignoring result from stale recognition session");
            return;
        }

        let utterance = transcript.trim().to_string();
        if utterance.is_empty() {
            self.transition(|turns| turns.end_listening(session));
            return;
        }

        self.append(Role::User, utterance.clone());
        match self.transition(TurnMachine::begin_turn) {
            Ok(turn) => self.handle_utterance(turn, utterance),
            Err(e) => warn!(error = %e, "Recognized utterance dropped"),
        }
    }

    fn on_recognition_ended(&mut self, session: RecognitionId) {
        if !self.transition(|turns| turns.end_listening(session)) {
            debug!(session, "Ignoring end of stale recognition session");
        }
    }

    // ========================================
    // Interaction handler
    // ========================================

    /// Begin a user-initiated turn, tearing down whatever it supersedes
    fn start_turn(&mut self) -> Option<TurnId> {
        let superseded = self.turns.state();
        let session = self.turns.active_recognition();

        match self.transition(TurnMachine::begin_turn) {
            Ok(turn) => {
                if let Some(session) = session {
                    self.platform.recognizer.stop(session);
                }
                if superseded == InteractionState::Speaking {
                    self.platform.audio.stop();
                }
                Some(turn)
            }
            Err(e) => {
                warn!(error = %e, "Refusing new turn");
                None
            }
        }
    }

    fn on_chat(&mut self, text: String) {
        let utterance = text.trim().to_string();
        if utterance.is_empty() {
            return;
        }
        let Some(turn) = self.start_turn() else {
            return;
        };
        self.append(Role::User, utterance.clone());
        self.handle_utterance(turn, utterance);
    }

    /// Route an utterance: run request or chat
    ///
    /// The utterance must already be the last message of the log.
    fn handle_utterance(&mut self, turn: TurnId, utterance: String) {
        if phrases::is_run_request(&utterance) {
            self.validate(turn);
            return;
        }

        let end = self.messages.len().saturating_sub(1);
        let start = end.saturating_sub(self.history_window);
        let history: Vec<ChatTurn> = self.messages[start..end].iter().map(ChatTurn::from).collect();

        let advance_from = self
            .progression
            .wants_advance(phrases::mentions_next(&utterance), &self.code)
            .then(|| self.progression.lesson_index());

        let critique = self.critique.clone();
        let code = self.code.clone();
        debug!(turn, history = history.len(), "Requesting chat reply");
        self.report(async move {
            let reply = critique.chat_respond(&history, &code, &utterance).await;
            Command::ChatReplied {
                turn,
                reply,
                advance_from,
            }
        });
    }

    fn on_chat_replied(&mut self, turn: TurnId, reply: String, advance_from: Option<usize>) {
        self.append(Role::Ai, reply.clone());
        self.speak_if_current(turn, reply);

        if advance_from == Some(self.progression.lesson_index()) {
            self.advance_lesson();
        }
    }

    // ========================================
    // Run / validate
    // ========================================

    fn on_run_code(&mut self) {
        if let Some(turn) = self.start_turn() {
            self.validate(turn);
        }
    }

    fn validate(&mut self, turn: TurnId) {
        self.append(Role::Ai, phrases::CHECKING);

        let lesson_index = self.progression.lesson_index();
        let lesson = self.progression.current_lesson().clone();
        let code = self.code.clone();
        let critique = self.critique.clone();
        info!(turn, lesson_id = lesson.id, "Validating code");

        self.report(async move {
            let verdict = critique.validate_code(&code, &lesson).await;
            Command::Validated {
                turn,
                lesson_index,
                verdict,
            }
        });
    }

    fn on_validated(&mut self, turn: TurnId, lesson_index: usize, verdict: Verdict) {
        let Some(lesson) = self.progression.catalog().lesson(lesson_index).cloned() else {
            warn!(lesson_index, "Verdict for unknown lesson");
            return;
        };

        if verdict.passed {
            let total = self.progression.award_xp(lesson.xp_reward);
            info!(lesson_id = lesson.id, earned = lesson.xp_reward, total, "Validation passed");
            self.events.emit_lossy(TutorEvent::XpAwarded {
                earned: lesson.xp_reward,
                total,
                timestamp: Utc::now(),
            });
            self.events.emit_lossy(TutorEvent::Celebrate {
                timestamp: Utc::now(),
            });
            if self.progression.record_pass() {
                self.emit_challenge();
            }

            let line = phrases::hype(&mut rand::thread_rng(), lesson.xp_reward);
            self.append(Role::Ai, line.clone());
            self.speak_if_current(turn, line);

            if let Some(badge_id) = lesson.badge_reward {
                let delay = self.badge_delay;
                self.report(async move {
                    tokio::time::sleep(delay).await;
                    Command::UnlockBadge { badge_id }
                });
            }
            return;
        }

        info!(lesson_id = lesson.id, "Validation failed");
        match self.progression.record_failure() {
            None => {
                let line = phrases::not_quite(&verdict.feedback);
                self.append(Role::Ai, line.clone());
                self.speak_if_current(turn, line);
            }
            Some(ChallengeOutcome::Failed) => {
                self.append(Role::Ai, phrases::CHALLENGE_FAILED);
                self.emit_challenge();
                self.speak_if_current(turn, phrases::CHALLENGE_FAILED.to_string());
            }
            Some(ChallengeOutcome::LivesLeft(lives)) => {
                let line = phrases::lives_left(lives);
                self.append(Role::Ai, line.clone());
                self.emit_challenge();
                if self.turns.is_processing(turn) {
                    self.finish_locally(
                        &line,
                        VoiceProfile::for_emotion(Emotion::Encouraging),
                        |turns| turns.settle(turn),
                    );
                } else {
                    debug!(turn, "Turn superseded, not speaking lives left");
                }
            }
        }
    }

    // ========================================
    // Progression
    // ========================================

    fn advance_lesson(&mut self) {
        match self.progression.advance() {
            Advance::Moved(lesson) => {
                self.code.push('\n');
                info!(lesson_id = lesson.id, title = %lesson.title, "Advanced lesson");
                self.events.emit_lossy(TutorEvent::CodeReplaced {
                    code: self.code.clone(),
                    timestamp: Utc::now(),
                });
                self.events.emit_lossy(TutorEvent::LessonChanged {
                    lesson_id: lesson.id,
                    title: lesson.title.clone(),
                    objective: lesson.objective.clone(),
                    timestamp: Utc::now(),
                });
                self.announce(phrases::moving_on(&lesson));
            }
            Advance::Finished => {
                info!("All lessons complete");
                self.announce(phrases::COURSE_COMPLETE.to_string());
            }
        }
    }

    fn on_unlock_badge(&mut self, badge_id: &str) {
        if let Some(badge) = self.progression.unlock_badge(badge_id) {
            info!(badge_id, name = %badge.name, "Badge unlocked");
            self.append(Role::Ai, phrases::badge_unlocked(&badge.name));
            self.events.emit_lossy(TutorEvent::BadgeUnlocked {
                badge_id: badge.id,
                name: badge.name,
                timestamp: Utc::now(),
            });
        }
    }

    // ========================================
    // Live feedback
    // ========================================

    fn on_edit(&mut self, code: String) {
        self.code = code;
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        self.feedback.on_edit(&self.code, move |generation| {
            let _ = tx.send(Command::AnalysisDue { generation });
        });
    }

    fn on_analysis_due(&mut self, generation: u64) {
        let Some(code) = self.feedback.take_due(generation) else {
            return;
        };

        match self.feedback.analyze(&code) {
            Analysis::Hint { text, emotion } => {
                debug!(generation, "Local tag hint");
                self.append(Role::Ai, text);
                self.speak_if_idle(text, VoiceProfile::for_emotion(emotion));
            }
            Analysis::RemoteTip => {
                if self.feedback.try_begin_tip() {
                    self.request_tip(code);
                }
            }
            Analysis::Nothing => debug!(generation, "No feedback for snapshot"),
        }
    }

    fn request_tip(&mut self, code: String) {
        let Some(tx) = self.tx.upgrade() else {
            self.feedback.settle_tip();
            return;
        };
        let prompt = prompts::tip_prompt(&self.progression.current_lesson().objective, &code);
        let critique = self.critique.clone();

        tokio::spawn(async move {
            let mut settle = SettleOnDrop::new(tx);
            match critique.try_chat(&[], &code, &prompt).await {
                Ok(reply) => settle.reply = Some(reply),
                Err(e) => debug!(error = %e, "Tip request failed"),
            }
        });
    }

    fn on_tip_settled(&mut self, reply: Option<String>) {
        self.feedback.settle_tip();
        let Some(tip) = reply.as_deref().and_then(|r| self.feedback.accept_tip(r)) else {
            return;
        };
        self.append(Role::Ai, tip.clone());
        self.speak_if_idle(&tip, VoiceProfile::for_emotion(Emotion::Encouraging));
    }
}
