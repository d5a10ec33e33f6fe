//! Bootstrap exchange for the first turn of a session.
//!
//! There is no system role, so system-style instructions are simulated as a
//! fake first exchange: an instruction sent "by the user" and a greeting sent
//! "by the assistant". It is injected only when the History is empty and is
//! not stored in the History.

use serde::{Deserialize, Serialize};

/// Default instruction used as the synthetic first user message.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful AI assistant. When greeted, respond with a friendly greeting and ask how you can help.";

/// Default greeting used as the synthetic first assistant message.
pub const DEFAULT_GREETING: &str =
    "Hello! I'm TokChat, your AI assistant. How can I help you today?";

/// Synthetic first exchange (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapExchange {
    pub instruction: String,
    pub greeting: String,
}

impl BootstrapExchange {
    pub fn new(instruction: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            greeting: greeting.into(),
        }
    }
}

impl Default for BootstrapExchange {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUCTION, DEFAULT_GREETING)
    }
}
