//! Structural markers that frame a conversation.
//!
//! The engine only understands user/assistant alternation, so each turn is
//! delimited by a pair of reserved tokens, and every prompt starts with a
//! beginning-of-sequence token.

use super::TokenId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five reserved markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMarker {
    Bos,
    UserStart,
    UserEnd,
    AssistantStart,
    AssistantEnd,
}

impl SpecialMarker {
    /// All markers, in the order the sanitizer strips them.
    pub const ALL: [SpecialMarker; 5] = [
        SpecialMarker::AssistantEnd,
        SpecialMarker::AssistantStart,
        SpecialMarker::UserStart,
        SpecialMarker::UserEnd,
        SpecialMarker::Bos,
    ];

    /// The literal text the tokenizer uses for this marker.
    pub fn literal(&self) -> &'static str {
        match self {
            SpecialMarker::Bos => "<|bos|>",
            SpecialMarker::UserStart => "<|user_start|>",
            SpecialMarker::UserEnd => "<|user_end|>",
            SpecialMarker::AssistantStart => "<|assistant_start|>",
            SpecialMarker::AssistantEnd => "<|assistant_end|>",
        }
    }

    /// Look up a marker from its literal text.
    pub fn from_literal(literal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.literal() == literal)
    }
}

impl fmt::Display for SpecialMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// Marker ids resolved from a tokenizer.
///
/// Resolved once per session and never mutated afterwards; being `Copy`,
/// it can be handed to every session without synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub bos: TokenId,
    pub user_start: TokenId,
    pub user_end: TokenId,
    pub assistant_start: TokenId,
    pub assistant_end: TokenId,
}

impl SpecialTokens {
    /// Token id for a marker.
    pub fn id(&self, marker: SpecialMarker) -> TokenId {
        match marker {
            SpecialMarker::Bos => self.bos,
            SpecialMarker::UserStart => self.user_start,
            SpecialMarker::UserEnd => self.user_end,
            SpecialMarker::AssistantStart => self.assistant_start,
            SpecialMarker::AssistantEnd => self.assistant_end,
        }
    }

    /// Reverse lookup: which marker (if any) a token id stands for.
    pub fn marker(&self, id: TokenId) -> Option<SpecialMarker> {
        SpecialMarker::ALL.into_iter().find(|m| self.id(*m) == id)
    }

    /// Returns true if the id is any of the five markers.
    pub fn is_special(&self, id: TokenId) -> bool {
        self.marker(id).is_some()
    }

    /// Returns true for tokens that end an assistant turn from the engine's
    /// point of view.
    pub fn ends_turn(&self, id: TokenId) -> bool {
        id == self.assistant_end || id == self.bos
    }
}
