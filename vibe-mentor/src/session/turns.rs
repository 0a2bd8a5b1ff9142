//! Interaction turn state machine
//!
//! One value per session: idle, listening, processing or speaking. Every
//! phase that waits on an asynchronous operation carries the token minted
//! when it was entered. Completions present their token; a token that is no
//! longer the active one belongs to an abandoned operation and is ignored.

use thiserror::Error;
use vibe_common::events::InteractionState;

/// Recognition session token
pub type RecognitionId = u64;
/// AI turn token
pub type TurnId = u64;
/// Audio playback token
pub type PlaybackId = u64;

/// Refused transition
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("an AI turn is already processing")]
    Busy,
    #[error("voice capture requires the idle state (currently {0})")]
    NotIdle(InteractionState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Listening { session: RecognitionId },
    Processing { turn: TurnId },
    Speaking { turn: TurnId, playback: PlaybackId },
}

/// What an interrupt abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Nothing,
    Turn(TurnId),
    Playback(PlaybackId),
}

#[derive(Debug)]
pub struct TurnMachine {
    phase: Phase,
    last_token: u64,
}

impl TurnMachine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            last_token: 0,
        }
    }

    /// Public view of the current phase
    pub fn state(&self) -> InteractionState {
        match self.phase {
            Phase::Idle => InteractionState::Idle,
            Phase::Listening { .. } => InteractionState::Listening,
            Phase::Processing { .. } => InteractionState::Processing,
            Phase::Speaking { .. } => InteractionState::Speaking,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    fn mint(&mut self) -> u64 {
        self.last_token += 1;
        self.last_token
    }

    /// Idle -> Listening
    pub fn begin_listening(&mut self) -> Result<RecognitionId, TurnError> {
        if self.phase != Phase::Idle {
            return Err(TurnError::NotIdle(self.state()));
        }
        let session = self.mint();
        self.phase = Phase::Listening { session };
        Ok(session)
    }

    /// Active recognition session, if listening
    pub fn active_recognition(&self) -> Option<RecognitionId> {
        match self.phase {
            Phase::Listening { session } => Some(session),
            _ => None,
        }
    }

    /// Listening -> Idle, only for the active session
    ///
    /// Returns false when the session was already superseded.
    pub fn end_listening(&mut self, session: RecognitionId) -> bool {
        if self.phase == (Phase::Listening { session }) {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Enter Processing for a new AI turn
    ///
    /// Supersedes Idle, Listening and Speaking. Refused while another turn is
    /// processing.
    pub fn begin_turn(&mut self) -> Result<TurnId, TurnError> {
        if let Phase::Processing { .. } = self.phase {
            return Err(TurnError::Busy);
        }
        let turn = self.mint();
        self.phase = Phase::Processing { turn };
        Ok(turn)
    }

    /// Whether `turn` is still processing
    pub fn is_processing(&self, turn: TurnId) -> bool {
        self.phase == (Phase::Processing { turn })
    }

    /// Processing -> Speaking for the active turn
    pub fn begin_speaking(&mut self, turn: TurnId) -> Option<PlaybackId> {
        if !self.is_processing(turn) {
            return None;
        }
        let playback = self.mint();
        self.phase = Phase::Speaking { turn, playback };
        Some(playback)
    }

    /// Active playback, if speaking
    pub fn active_playback(&self) -> Option<PlaybackId> {
        match self.phase {
            Phase::Speaking { playback, .. } => Some(playback),
            _ => None,
        }
    }

    /// Processing -> Idle when a turn ends without audio
    pub fn settle(&mut self, turn: TurnId) -> bool {
        if self.is_processing(turn) {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Speaking -> Idle on natural completion of the active playback
    pub fn finish_playback(&mut self, playback: PlaybackId) -> bool {
        match self.phase {
            Phase::Speaking { playback: active, .. } if active == playback => {
                self.phase = Phase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Explicit stop: Processing or Speaking -> Idle
    ///
    /// Listening is left alone; the recognizer has its own stop.
    pub fn interrupt(&mut self) -> Interrupted {
        let abandoned = match self.phase {
            Phase::Processing { turn } => Interrupted::Turn(turn),
            Phase::Speaking { playback, .. } => Interrupted::Playback(playback),
            Phase::Idle | Phase::Listening { .. } => return Interrupted::Nothing,
        };
        self.phase = Phase::Idle;
        abandoned
    }
}

impl Default for TurnMachine {
    fn default() -> Self {
        Self::new()
    }
}
