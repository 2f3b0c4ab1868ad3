//! Bakebot SDK
//!
//! Shared library providing the error taxonomy and the chat wire types.
//! This crate is used by the engine and by anything that talks to its HTTP API.

/// Error types and handling
pub mod errors;

/// Chat request/response and transcript types
pub mod types;

// Re-export commonly used types
pub use errors::{BakebotErrorExt, EngineError};
pub use types::{ChatReply, ChatRequest, ModeLabel, Speaker, TranscriptEntry};
