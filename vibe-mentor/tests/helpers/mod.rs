//! Test helper modules for vibe-mentor integration tests
//!
//! - fakes: scripted critique and speech services, a recording platform
//! - harness: a session wired to the fakes, plus polling helpers

#![allow(dead_code)]

pub mod fakes;
pub mod harness;

pub use fakes::{FakeCritique, FakeSpeech, PlatformCall, RecordingPlatform};
pub use harness::TestSession;
