//! Reply entity

use crate::generation::result::StopReason;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sanitized assistant reply for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    text: String,
    token_count: usize,
    stop_reason: StopReason,
}

impl Reply {
    pub fn new(text: impl Into<String>, token_count: usize, stop_reason: StopReason) -> Self {
        Self {
            text: text.into(),
            token_count,
            stop_reason,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Number of generated tokens the reply was decoded from.
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
