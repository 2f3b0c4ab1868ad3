//! Dialogue Memory
//!
//! Append-only log of the conversation. Turns are stored in the order they
//! were exchanged (user input, assistant replies, function calls, tool
//! results) and are never reordered, edited or removed. Multi-turn writes go
//! through `extend`, which takes ownership of the whole batch so readers
//! never observe half of it.

use crate::llm::{Part, Turn};

/// Average characters per token (rough estimate: 1 token ≈ 4 characters)
const CHARS_PER_TOKEN: usize = 4;

/// Per-turn overhead for role and structure, in tokens
const TURN_OVERHEAD_TOKENS: usize = 10;

/// Ordered conversation history owned by one agent
#[derive(Debug, Clone, Default)]
pub struct DialogueMemory {
    turns: Vec<Turn>,

    /// Running token estimate, for logging
    token_count: usize,
}

impl DialogueMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn
    pub fn push(&mut self, turn: Turn) {
        self.token_count += Self::estimate_tokens(&turn);
        self.turns.push(turn);
    }

    /// Append a batch of turns in order, all at once
    pub fn extend(&mut self, turns: Vec<Turn>) {
        self.token_count += turns.iter().map(Self::estimate_tokens).sum::<usize>();
        self.turns.extend(turns);
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Estimated size of the whole history in tokens
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Rough token estimate for one turn, based on character count of text
    /// and serialized call/response payloads.
    fn estimate_tokens(turn: &Turn) -> usize {
        let chars: usize = turn
            .parts
            .iter()
            .map(|part| match part {
                Part::Text { text } => text.len(),
                Part::FunctionCall(call) => call.name.len() + call.args.to_string().len(),
                Part::FunctionResponse(response) => {
                    response.name.len() + response.response.to_string().len()
                }
            })
            .sum();

        chars.div_ceil(CHARS_PER_TOKEN) + TURN_OVERHEAD_TOKENS
    }
}
