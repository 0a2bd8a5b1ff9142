//! # vibe-gateway
//!
//! Thin server-side proxy that keeps the upstream API key off the client.
//! Three endpoints: conversational chat, code validation and speech
//! synthesis, all backed by one OpenAI-compatible upstream.

pub mod api;
pub mod error;
pub mod prompts;
pub mod upstream;

pub use api::{build_router, AppState};
pub use error::{ApiError, UpstreamError};
pub use upstream::{Completion, GroqClient, Upstream, UpstreamMessage};
