//! Conversation Mode
//!
//! Decides which fixed instruction steers the next reply. A successful recipe
//! fetch enters `Contextual`; a guided reply containing `Done` returns to `Idle`.

use super::prompts::{CASUAL_CHAT_INSTRUCTION, GUIDED_COOKING_INSTRUCTION};
use sdk::ModeLabel;
use std::fmt;

/// Conversation mode.
///
/// `Idle` is casual chat. `Contextual` means a recipe has been fetched and
/// the agent is walking the user through it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Idle,
    Contextual,
}

impl Mode {
    /// System instruction active in this mode
    pub fn instruction(self) -> &'static str {
        match self {
            Mode::Idle => CASUAL_CHAT_INSTRUCTION,
            Mode::Contextual => GUIDED_COOKING_INSTRUCTION,
        }
    }

    pub fn is_contextual(self) -> bool {
        self == Mode::Contextual
    }

    pub fn label(self) -> ModeLabel {
        match self {
            Mode::Idle => ModeLabel::Idle,
            Mode::Contextual => ModeLabel::Contextual,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
