//! Run/validate and progression integration tests

mod helpers;

use helpers::{FakeCritique, FakeSpeech, PlatformCall, TestSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use vibe_common::events::{Emotion, InteractionState, TutorEvent, VoiceProfile};
use vibe_common::models::{ChallengeState, STARTING_LIVES};

/// Finish the current spoken turn so the next request starts from idle
async fn finish_turn(session: &TestSession) {
    let snapshot = session
        .wait_for("turn to speak or settle", |s| {
            s.state == InteractionState::Speaking || s.state == InteractionState::Idle
        })
        .await;
    if snapshot.state == InteractionState::Speaking {
        let playback = *session.platform.playbacks().last().unwrap();
        session.handle.playback_ended(playback).unwrap();
    }
    session.wait_for_state(InteractionState::Idle).await;
}

#[tokio::test(start_paused = true)]
async fn test_pass_awards_xp_celebrates_and_unlocks_badge_once() {
    let mut session = TestSession::start();

    session.handle.run_code().unwrap();
    session.wait_for("xp awarded", |s| s.xp == 100).await;

    let lines = session.ai_lines().await;
    assert!(lines.iter().any(|l| l == "Checking your vibes... 👀"));
    assert!(lines.last().unwrap().contains("+100 XP"));

    let events = session.drain_events();
    assert!(events.iter().any(|e| matches!(e, TutorEvent::Celebrate { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, TutorEvent::XpAwarded { earned: 100, total: 100, .. })));

    // Badge lands after the celebration delay
    assert!(session.snapshot().await.badges.iter().all(|b| !b.unlocked));
    tokio::time::sleep(Duration::from_millis(1100)).await;
    session.settle().await;
    let snapshot = session.snapshot().await;
    assert!(snapshot.badges.iter().any(|b| b.id == "b1" && b.unlocked));
    assert_eq!(session.last_text().await, "🏅 UNLOCKED BADGE: HTML Rookie!");
    finish_turn(&session).await;

    // Passing again pays xp but never re-announces the badge
    session.handle.run_code().unwrap();
    session.wait_for("xp awarded again", |s| s.xp == 200).await;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    session.settle().await;
    let announcements = session
        .ai_lines()
        .await
        .into_iter()
        .filter(|l| l.starts_with("🏅"))
        .count();
    assert_eq!(announcements, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fail_without_challenge_speaks_feedback() {
    let critique = FakeCritique::new().with_verdict(false, "Close that h1 tag.");
    let session = TestSession::with(critique, FakeSpeech::new());

    session.handle.run_code().unwrap();
    session.wait_for_state(InteractionState::Speaking).await;

    assert_eq!(session.last_text().await, "Not quite. Close that h1 tag.");
    assert_eq!(session.snapshot().await.xp, 0);
}

#[tokio::test(start_paused = true)]
async fn test_validation_outage_reads_as_failure() {
    let session = TestSession::with(FakeCritique::new().failing_validation(), FakeSpeech::new());

    session.handle.run_code().unwrap();
    session.wait_for_state(InteractionState::Speaking).await;

    assert_eq!(
        session.last_text().await,
        "Not quite. My brain glitched checking that. Try again?"
    );
}

#[tokio::test(start_paused = true)]
async fn test_challenge_lives_then_reset() {
    let critique = FakeCritique::new().with_verdict(false, "Nope.");
    let mut session = TestSession::with(critique, FakeSpeech::new());

    session.handle.toggle_challenge().unwrap();
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.challenge, ChallengeState::fresh(true));

    // Lives 3 -> 2 -> 1, spoken locally and settled straight to idle
    for remaining in [2u32, 1] {
        session.handle.run_code().unwrap();
        session
            .wait_for("life lost", |s| s.challenge.lives == remaining)
            .await;
        finish_turn(&session).await;
        let line = format!("Ouch! {remaining} lives left. You got this!");
        assert_eq!(session.last_text().await, line);
        assert_eq!(
            session.platform.spoken_locally().last(),
            Some(&(line, VoiceProfile::for_emotion(Emotion::Encouraging)))
        );
    }
    assert!(session.platform.playbacks().is_empty());

    // Last life: announce and reset
    session.handle.run_code().unwrap();
    session.wait_for_state(InteractionState::Speaking).await;
    assert_eq!(
        session.last_text().await,
        "Challenge failed! Life is hard, but we go again. Normal mode on."
    );
    let snapshot = session.snapshot().await;
    assert!(!snapshot.challenge.enabled);
    assert_eq!(snapshot.challenge.lives, STARTING_LIVES);
    assert_eq!(snapshot.challenge.streak, 0);

    let challenge_events = session
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, TutorEvent::ChallengeChanged { .. }))
        .count();
    assert_eq!(challenge_events, 4, "toggle plus three failures");
}

#[tokio::test(start_paused = true)]
async fn test_streak_counts_passes_in_challenge_mode() {
    let session = TestSession::start();
    session.handle.toggle_challenge().unwrap();

    session.handle.run_code().unwrap();
    let snapshot = session.wait_for("streak", |s| s.challenge.streak == 1).await;
    assert_eq!(snapshot.challenge.lives, STARTING_LIVES);
}

#[tokio::test(start_paused = true)]
async fn test_verdict_applies_to_lesson_active_at_request_time() {
    let gate = Arc::new(Semaphore::new(0));
    let session = TestSession::with(FakeCritique::new().gated(gate.clone()), FakeSpeech::new());

    session.handle.run_code().unwrap();
    session.wait_for_state(InteractionState::Processing).await;
    session.handle.advance_lesson().unwrap();
    assert_eq!(session.snapshot().await.lesson_index, 1);

    gate.add_permits(1);
    // Lesson 1 pays 100, lesson 2 would pay 150
    session.wait_for("xp awarded", |s| s.xp == 100).await;
    assert_eq!(session.critique.validated_lessons(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_run_still_applies_progression() {
    let gate = Arc::new(Semaphore::new(0));
    let session = TestSession::with(FakeCritique::new().gated(gate.clone()), FakeSpeech::new());

    session.handle.run_code().unwrap();
    session.wait_for_state(InteractionState::Processing).await;
    session.handle.stop_speaking().unwrap();
    session.wait_for_state(InteractionState::Idle).await;

    gate.add_permits(1);
    session.wait_for("xp awarded", |s| s.xp == 100).await;
    session.settle().await;
    assert_eq!(session.speech.calls(), 0);
    assert_eq!(session.snapshot().await.state, InteractionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_advance_appends_newline_and_announces() {
    let mut session = TestSession::start();

    session.handle.advance_lesson().unwrap();
    let snapshot = session.wait_for("lesson advanced", |s| s.lesson_index == 1).await;
    assert_eq!(snapshot.lesson.id, 2);
    assert_ne!(snapshot.state, InteractionState::Idle, "announcement is being voiced");
    assert_eq!(snapshot.code, "<!-- Delete this and start cooking! -->\n\n");
    assert_eq!(
        session.last_text().await,
        "Moving on! Next mission: The Bio. Add a <p> tag below the header to describe your vibe."
    );

    let events = session.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, TutorEvent::LessonChanged { lesson_id: 2, .. })));
    assert!(events.iter().any(|e| matches!(e, TutorEvent::CodeReplaced { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_advance_past_last_lesson_completes_course() {
    let session = TestSession::start();

    session.handle.advance_lesson().unwrap();
    finish_turn(&session).await;
    session.handle.advance_lesson().unwrap();
    finish_turn(&session).await;
    assert!(session.snapshot().await.is_last_lesson);

    session.handle.advance_lesson().unwrap();
    finish_turn(&session).await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.lesson_index, 2);
    assert_eq!(
        session.last_text().await,
        "You crushed all the demo levels! You're officially a Vibe Coder. 🏆"
    );
}

#[tokio::test(start_paused = true)]
async fn test_next_intent_advances_when_token_present() {
    let session = TestSession::start();

    session.handle.edit("<h1>Nova</h1>").unwrap();
    session.handle.chat("ok next one please").unwrap();
    session.wait_for("lesson advanced", |s| s.lesson_index == 1).await;

    let lines = session.ai_lines().await;
    assert!(lines.iter().any(|l| l.starts_with("Moving on! Next mission: The Bio.")));
}

#[tokio::test(start_paused = true)]
async fn test_next_intent_ignored_without_token() {
    let session = TestSession::start();

    session.handle.chat("next").unwrap();
    finish_turn(&session).await;
    assert_eq!(session.snapshot().await.lesson_index, 0);
    assert!(!session
        .platform
        .calls()
        .iter()
        .any(|c| matches!(c, PlatformCall::SpeakLocally { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_challenge_failure_costs_a_life_silently() {
    let gate = Arc::new(Semaphore::new(0));
    let critique = FakeCritique::new()
        .with_verdict(false, "Nope.")
        .gated(gate.clone());
    let session = TestSession::with(critique, FakeSpeech::new());
    session.handle.toggle_challenge().unwrap();

    session.handle.run_code().unwrap();
    session.wait_for_state(InteractionState::Processing).await;
    session.handle.stop_speaking().unwrap();
    session.wait_for_state(InteractionState::Idle).await;

    // The learner opens the mic before the verdict lands
    session.handle.toggle_listening().unwrap();
    session.wait_for_state(InteractionState::Listening).await;
    let spoken_before = session.platform.spoken_locally().len();

    gate.add_permits(1);
    session.wait_for("life lost", |s| s.challenge.lives == 2).await;
    session.settle().await;

    assert_eq!(session.last_text().await, "Ouch! 2 lives left. You got this!");
    assert_eq!(session.platform.spoken_locally().len(), spoken_before);
    assert_eq!(session.snapshot().await.state, InteractionState::Listening);
}
