//! Conversation Agent
//!
//! Classifies each user message, dispatches on the intent and keeps the
//! conversation's memory and mode. One agent serves one conversation.

pub mod core;
pub mod intent;
pub mod memory;
pub mod mode;
pub mod prompts;

pub use core::{ConversationAgent, TurnResult};
pub use intent::{ClassifierOptions, Intent, IntentClassifier};
pub use memory::DialogueMemory;
pub use mode::Mode;
