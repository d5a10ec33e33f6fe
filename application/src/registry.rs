//! Special-token registry.
//!
//! Resolves the five structural markers to token ids once per tokenizer.
//! The result is a `Copy` value that every session can share read-only.

use crate::ports::tokenizer::{Tokenizer, TokenizerError};
use std::collections::HashMap;
use thiserror::Error;
use tokchat_domain::{SpecialMarker, SpecialTokens, TokenId};
use tracing::debug;

/// Errors that can occur while resolving markers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Failed to resolve {marker}: {source}")]
    Unresolved {
        marker: SpecialMarker,
        #[source]
        source: TokenizerError,
    },

    #[error("{first} and {second} resolve to the same token id {id}")]
    DuplicateId {
        first: SpecialMarker,
        second: SpecialMarker,
        id: TokenId,
    },
}

/// Resolves [`SpecialTokens`] from a [`Tokenizer`].
pub struct SpecialTokenRegistry;

impl SpecialTokenRegistry {
    /// Resolve every marker.
    ///
    /// `bos` comes from [`Tokenizer::bos_token_id`]; the turn delimiters are
    /// looked up by their literal text. Two markers sharing an id would make
    /// the framing ambiguous, so that is rejected.
    pub fn resolve(tokenizer: &dyn Tokenizer) -> Result<SpecialTokens, RegistryError> {
        let lookup = |marker: SpecialMarker| {
            tokenizer
                .resolve_special(marker.literal())
                .map_err(|source| RegistryError::Unresolved { marker, source })
        };

        let tokens = SpecialTokens {
            bos: tokenizer.bos_token_id(),
            user_start: lookup(SpecialMarker::UserStart)?,
            user_end: lookup(SpecialMarker::UserEnd)?,
            assistant_start: lookup(SpecialMarker::AssistantStart)?,
            assistant_end: lookup(SpecialMarker::AssistantEnd)?,
        };

        let mut seen: HashMap<TokenId, SpecialMarker> = HashMap::new();
        for marker in SpecialMarker::ALL {
            let id = tokens.id(marker);
            if let Some(&first) = seen.get(&id) {
                return Err(RegistryError::DuplicateId {
                    first,
                    second: marker,
                    id,
                });
            }
            seen.insert(id, marker);
        }

        debug!(
            "Resolved special tokens: bos={} user=({}, {}) assistant=({}, {})",
            tokens.bos,
            tokens.user_start,
            tokens.user_end,
            tokens.assistant_start,
            tokens.assistant_end
        );

        Ok(tokens)
    }
}
