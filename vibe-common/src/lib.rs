//! # Code Vibe Common Library
//!
//! Shared code for the Code Vibe services:
//! - Tutor data model (lessons, badges, roadmap, messages, challenge state)
//! - Built-in lesson catalog and static leaderboard
//! - Event types (TutorEvent enum) and EventBus
//! - Configuration loading
//! - Common error type

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use catalog::Catalog;
pub use error::{Error, Result};
