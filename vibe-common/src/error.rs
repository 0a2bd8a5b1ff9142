//! Common error types for Code Vibe

use thiserror::Error;

/// Common result type for Code Vibe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Code Vibe services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog content violates a structural rule
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
