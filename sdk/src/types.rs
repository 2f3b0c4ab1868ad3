//! Chat wire types shared by the delivery surfaces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for a single chat exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Create a new ChatRequest
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Conversation mode as reported to clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModeLabel {
    /// Casual conversation
    Idle,

    /// Guiding the user through a recipe
    Contextual,
}

impl fmt::Display for ModeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeLabel::Idle => write!(f, "idle"),
            ModeLabel::Contextual => write!(f, "contextual"),
        }
    }
}

/// Reply to a single chat exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    /// Assistant reply text (markdown)
    pub reply: String,

    /// Mode after the exchange
    pub mode: ModeLabel,

    /// Whether the reply is an apology for a failed turn
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

/// Who said a transcript line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Assistant => write!(f, "assistant"),
        }
    }
}

/// One visible line of the chat transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,

    /// Raw text as typed or generated
    pub text: String,

    pub sent_at: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Create a user line stamped with the current time
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    /// Create an assistant line stamped with the current time
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}
