//! Error types for vibe-mentor
//!
//! Module-specific error types using thiserror.

use thiserror::Error;

/// Main error type for vibe-mentor
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shared crate errors (catalog, config files)
    #[error(transparent)]
    Common(#[from] vibe_common::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// The session actor has shut down
    #[error("Session closed")]
    SessionClosed,

    /// A platform capability is unavailable
    #[error("Capability unavailable: {0}")]
    Capability(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using vibe-mentor Error
pub type Result<T> = std::result::Result<T, Error>;
