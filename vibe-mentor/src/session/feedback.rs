//! Live feedback engine
//!
//! Watches editor contents and, after a quiet period following a significant
//! edit, produces at most one piece of feedback: a local tag hint or a short
//! remote tip.
//!
//! The engine owns the debounce timer and the tip in-flight flag. It never
//! performs I/O itself; the session actor runs the remote request and feeds
//! the outcome back.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use vibe_common::config::FeedbackTuning;
use vibe_common::events::Emotion;

use crate::critique::prompts::TIP_SENTINEL;

/// Local rule: an opened tag that is never closed
#[derive(Debug, Clone, Copy)]
pub struct TagHint {
    pub open: &'static str,
    pub close: &'static str,
    pub text: &'static str,
    pub emotion: Emotion,
}

impl TagHint {
    fn matches(&self, code: &str) -> bool {
        code.contains(self.open) && !code.contains(self.close)
    }
}

/// Local rules, checked in order
pub const TAG_HINTS: &[TagHint] = &[
    TagHint {
        open: "<h1",
        close: "</h1>",
        text: "Yo, don't forget to close that h1 tag!",
        emotion: Emotion::Chill,
    },
    TagHint {
        open: "<p",
        close: "</p>",
        text: "Para tag needs a closer, fam!",
        emotion: Emotion::Encouraging,
    },
];

/// Result of observing an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Below the significance threshold; nothing changed
    Ignored,
    /// Analysis scheduled after the quiet period
    Scheduled { generation: u64 },
}

/// What a due analysis should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Hint { text: &'static str, emotion: Emotion },
    RemoteTip,
    Nothing,
}

struct PendingAnalysis {
    generation: u64,
    code: String,
    timer: JoinHandle<()>,
}

impl Drop for PendingAnalysis {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

pub struct FeedbackEngine {
    significance_threshold: usize,
    quiet_period: Duration,
    tip_min_code_len: usize,
    tip_max_len: usize,
    last_observed_len: usize,
    pending: Option<PendingAnalysis>,
    last_generation: u64,
    tip_in_flight: bool,
}

impl FeedbackEngine {
    pub fn new(tuning: &FeedbackTuning, initial_code: &str) -> Self {
        Self {
            significance_threshold: tuning.significance_threshold,
            quiet_period: tuning.quiet_period(),
            tip_min_code_len: tuning.tip_min_code_len,
            tip_max_len: tuning.tip_max_len,
            last_observed_len: initial_code.chars().count(),
            pending: None,
            last_generation: 0,
            tip_in_flight: false,
        }
    }

    /// Observe new editor contents
    ///
    /// A significant edit replaces any pending analysis with a new one over
    /// this snapshot. `on_due` runs after the quiet period unless a later
    /// edit cancels it first. Must be called from within a tokio runtime.
    pub fn on_edit<F>(&mut self, code: &str, on_due: F) -> EditOutcome
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let len = code.chars().count();
        if len.abs_diff(self.last_observed_len) < self.significance_threshold {
            return EditOutcome::Ignored;
        }

        self.last_observed_len = len;
        self.last_generation += 1;
        let generation = self.last_generation;
        let quiet_period = self.quiet_period;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            on_due(generation);
        });

        // Replacing the previous pending analysis aborts its timer
        self.pending = Some(PendingAnalysis {
            generation,
            code: code.to_string(),
            timer,
        });
        debug!(generation, len, "Scheduled code analysis");

        EditOutcome::Scheduled { generation }
    }

    /// Claim the snapshot for a fired timer
    ///
    /// Returns `None` when `generation` was superseded or cancelled.
    pub fn take_due(&mut self, generation: u64) -> Option<String> {
        match &self.pending {
            Some(pending) if pending.generation == generation => {}
            _ => {
                debug!(generation, "Discarding superseded analysis");
                return None;
            }
        }
        self.pending.take().map(|mut pending| std::mem::take(&mut pending.code))
    }

    /// Drop any pending analysis without running it
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Choose the single feedback act for `code`
    pub fn analyze(&self, code: &str) -> Analysis {
        if let Some(hint) = TAG_HINTS.iter().find(|hint| hint.matches(code)) {
            return Analysis::Hint {
                text: hint.text,
                emotion: hint.emotion,
            };
        }
        if code.chars().count() > self.tip_min_code_len && !self.tip_in_flight {
            return Analysis::RemoteTip;
        }
        Analysis::Nothing
    }

    /// Mark a tip request as started; false if one is already in flight
    pub fn try_begin_tip(&mut self) -> bool {
        if self.tip_in_flight {
            return false;
        }
        self.tip_in_flight = true;
        true
    }

    pub fn settle_tip(&mut self) {
        self.tip_in_flight = false;
    }

    pub fn tip_in_flight(&self) -> bool {
        self.tip_in_flight
    }

    /// Filter a raw tip reply down to something worth saying
    pub fn accept_tip(&self, reply: &str) -> Option<String> {
        let trimmed = reply.trim();
        if trimmed.is_empty() || trimmed.chars().count() >= self.tip_max_len {
            return None;
        }
        let bare = trimmed.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
        if bare.is_empty() || bare.eq_ignore_ascii_case(TIP_SENTINEL) {
            return None;
        }
        Some(trimmed.to_string())
    }
}
