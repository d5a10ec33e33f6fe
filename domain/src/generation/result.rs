//! Result of one generation pass.

use crate::token::TokenId;
use serde::{Deserialize, Serialize};

/// Why the driver stopped accumulating tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The engine's stream ended on its own.
    EngineFinished,
    /// The `max_new_tokens` ceiling was reached first.
    MaxTokens,
}

/// Tokens generated for a single reply, prompt excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    tokens: Vec<TokenId>,
    stop_reason: StopReason,
}

impl GenerationResult {
    pub fn new(tokens: Vec<TokenId>, stop_reason: StopReason) -> Self {
        Self {
            tokens,
            stop_reason,
        }
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    /// Returns true if the reply was cut off by the token ceiling.
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}
