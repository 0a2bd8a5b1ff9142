//! Tutor data model
//!
//! Catalog entries (lessons, badges, roadmap stages) are immutable once
//! loaded, apart from the `unlocked` flag on a badge. Messages form an
//! append-only log owned by the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lives granted when challenge mode is (re)entered
pub const STARTING_LIVES: u32 = 3;

/// One step of the guided lesson sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Ordinal position, starting at 1
    pub id: u32,
    pub title: String,
    pub objective: String,
    /// Code placed in the editor when the session starts on this lesson
    pub initial_code: String,
    /// Prose criterion handed to the remote validator
    pub validation_criteria: String,
    /// Marker substring used as a cheap local "likely complete" check
    pub validation_token: String,
    pub xp_reward: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_reward: Option<String>,
    /// "Why this matters" rationale shown next to the objective
    pub why: String,
}

impl Lesson {
    /// Whether `code` contains this lesson's validation token
    ///
    /// This is a convenience heuristic only. Completion is decided by the
    /// remote validator.
    pub fn looks_complete(&self, code: &str) -> bool {
        !self.validation_token.is_empty() && code.contains(&self.validation_token)
    }
}

/// Achievement badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    #[serde(default)]
    pub unlocked: bool,
}

/// Roadmap stage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapStatus {
    Locked,
    Active,
    Completed,
}

/// Stage of the long-term learning roadmap (read-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapStage {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub status: RoadmapStatus,
    pub topics: Vec<String>,
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Ai => write!(f, "ai"),
        }
    }
}

/// Entry of the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Challenge mode counters
///
/// While `enabled` is false the counters sit at their starting values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeState {
    pub enabled: bool,
    pub lives: u32,
    pub streak: u32,
}

impl ChallengeState {
    /// Fresh counters, enabled or not
    pub fn fresh(enabled: bool) -> Self {
        Self {
            enabled,
            lives: STARTING_LIVES,
            streak: 0,
        }
    }
}

impl Default for ChallengeState {
    fn default() -> Self {
        Self::fresh(false)
    }
}

/// Row of the (mock) leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub xp: u32,
    /// True for the current learner's row
    pub me: bool,
}
