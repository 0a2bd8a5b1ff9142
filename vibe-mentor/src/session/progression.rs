//! Progression controller
//!
//! Lesson pointer, experience points, badge unlocks and challenge mode.
//! Pure state; the session actor turns outcomes into messages and events.

use std::sync::Arc;
use vibe_common::models::{Badge, ChallengeState, Lesson};
use vibe_common::Catalog;

/// Result of a lesson advance request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved(Lesson),
    /// Already on the last lesson; the pointer stays put
    Finished,
}

/// Result of a failed validation in challenge mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    LivesLeft(u32),
    /// Out of lives; challenge mode has been switched off
    Failed,
}

pub struct Progression {
    catalog: Arc<Catalog>,
    lesson_index: usize,
    xp: u32,
    badges: Vec<Badge>,
    challenge: ChallengeState,
}

impl Progression {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let badges = catalog.badges.clone();
        Self {
            catalog,
            lesson_index: 0,
            xp: 0,
            badges,
            challenge: ChallengeState::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn lesson_index(&self) -> usize {
        self.lesson_index
    }

    /// Active lesson
    ///
    /// The catalog is validated non-empty and the index only ever points at
    /// an existing lesson.
    pub fn current_lesson(&self) -> &Lesson {
        &self.catalog.lessons[self.lesson_index]
    }

    pub fn is_last_lesson(&self) -> bool {
        self.catalog.is_last(self.lesson_index)
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn challenge(&self) -> ChallengeState {
        self.challenge
    }

    /// Add `amount` and return the new total
    pub fn award_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        self.xp
    }

    pub fn advance(&mut self) -> Advance {
        if self.is_last_lesson() {
            return Advance::Finished;
        }
        self.lesson_index += 1;
        Advance::Moved(self.current_lesson().clone())
    }

    /// Whether a chat utterance should also advance the lesson
    pub fn wants_advance(&self, mentions_next: bool, code: &str) -> bool {
        mentions_next && !self.is_last_lesson() && self.current_lesson().looks_complete(code)
    }

    /// Unlock a badge; returns it only on the first unlock
    pub fn unlock_badge(&mut self, badge_id: &str) -> Option<Badge> {
        let Some(badge) = self.badges.iter_mut().find(|b| b.id == badge_id) else {
            tracing::warn!(badge_id, "Ignoring unlock of unknown badge");
            return None;
        };
        if badge.unlocked {
            return None;
        }
        badge.unlocked = true;
        Some(badge.clone())
    }

    /// Flip challenge mode; counters start fresh either way
    pub fn toggle_challenge(&mut self) -> ChallengeState {
        self.challenge = ChallengeState::fresh(!self.challenge.enabled);
        self.challenge
    }

    /// Count a pass toward the streak
    ///
    /// Returns true when challenge mode is on and the counters changed.
    pub fn record_pass(&mut self) -> bool {
        if !self.challenge.enabled {
            return false;
        }
        self.challenge.streak += 1;
        true
    }

    /// Take a life for a failed validation
    ///
    /// Returns `None` when challenge mode is off.
    pub fn record_failure(&mut self) -> Option<ChallengeOutcome> {
        if !self.challenge.enabled {
            return None;
        }
        let lives = self.challenge.lives.saturating_sub(1);
        if lives == 0 {
            self.challenge = ChallengeState::fresh(false);
            Some(ChallengeOutcome::Failed)
        } else {
            self.challenge.lives = lives;
            Some(ChallengeOutcome::LivesLeft(lives))
        }
    }
}
