//! vibe-mentor library
//!
//! Session core of the Code Vibe tutor: live feedback on edits, the
//! interaction turn machine, run/validate and progression, plus the HTTP
//! clients for the critique and speech gateway.

pub mod api;
pub mod critique;
pub mod error;
pub mod platform;
pub mod session;
pub mod speech;

pub use error::{Error, Result};
pub use session::{spawn_session, SessionDeps, SessionHandle, SessionSnapshot};
