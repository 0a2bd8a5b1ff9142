//! Fixed tutor lines and utterance intents

use rand::seq::SliceRandom;
use rand::Rng;
use vibe_common::models::Lesson;

pub const WELCOME: &str =
    "Yo! I'm Vibe. Check the Roadmap to see where we're heading, then hit the mic to start!";

pub const CHECKING: &str = "Checking your vibes... 👀";

pub const CHALLENGE_FAILED: &str = "Challenge failed! Life is hard, but we go again. Normal mode on.";

pub const COURSE_COMPLETE: &str =
    "You crushed all the demo levels! You're officially a Vibe Coder. 🏆";

pub const VOICE_UNSUPPORTED: &str = "Voice not supported. Try Chrome.";

/// Hype lines for a passed validation; `{xp}` is replaced by the reward
pub const HYPE_PHRASES: &[&str] = &[
    "YOOOO +{xp} XP! You're cooking fr fr!",
    "SHEESH! +{xp} XP! Different breed!",
    "W! +{xp} XP! We're on one!",
];

const RUN_TRIGGERS: &[&str] = &["run code", "check code"];
const NEXT_TRIGGER: &str = "next";

pub fn not_quite(feedback: &str) -> String {
    format!("Not quite. {feedback}")
}

pub fn lives_left(lives: u32) -> String {
    format!("Ouch! {lives} lives left. You got this!")
}

pub fn moving_on(lesson: &Lesson) -> String {
    format!("Moving on! Next mission: {}. {}", lesson.title, lesson.objective)
}

pub fn badge_unlocked(name: &str) -> String {
    format!("🏅 UNLOCKED BADGE: {name}!")
}

pub fn hype<R: Rng + ?Sized>(rng: &mut R, xp: u32) -> String {
    let template = HYPE_PHRASES.choose(rng).copied().unwrap_or(HYPE_PHRASES[0]);
    template.replace("{xp}", &xp.to_string())
}

/// Utterance asks to run the code instead of chatting
pub fn is_run_request(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    RUN_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
}

/// Utterance mentions moving to the next lesson
pub fn mentions_next(utterance: &str) -> bool {
    utterance.to_lowercase().contains(NEXT_TRIGGER)
}
