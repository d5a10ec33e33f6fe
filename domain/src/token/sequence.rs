//! Framed token sequences.

use super::TokenId;
use super::special::{SpecialMarker, SpecialTokens};

/// An immutable sequence of token ids ready to be fed to the engine.
///
/// Built with a [`TokenSequenceBuilder`]; a new sequence is produced per turn
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenSequence {
    tokens: Vec<TokenId>,
}

impl TokenSequence {
    pub fn as_slice(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn first(&self) -> Option<TokenId> {
        self.tokens.first().copied()
    }

    pub fn last(&self) -> Option<TokenId> {
        self.tokens.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.tokens.iter().copied()
    }

    /// Number of occurrences of `id`.
    pub fn count(&self, id: TokenId) -> usize {
        self.tokens.iter().filter(|&&t| t == id).count()
    }

    pub fn into_vec(self) -> Vec<TokenId> {
        self.tokens
    }
}

impl From<Vec<TokenId>> for TokenSequence {
    fn from(tokens: Vec<TokenId>) -> Self {
        Self { tokens }
    }
}

impl AsRef<[TokenId]> for TokenSequence {
    fn as_ref(&self) -> &[TokenId] {
        &self.tokens
    }
}

/// Incremental builder that knows how to emit markers.
#[derive(Debug)]
pub struct TokenSequenceBuilder {
    specials: SpecialTokens,
    tokens: Vec<TokenId>,
}

impl TokenSequenceBuilder {
    pub fn new(specials: SpecialTokens) -> Self {
        Self {
            specials,
            tokens: Vec::new(),
        }
    }

    pub fn marker(&mut self, marker: SpecialMarker) -> &mut Self {
        self.tokens.push(self.specials.id(marker));
        self
    }

    pub fn extend(&mut self, ids: &[TokenId]) -> &mut Self {
        self.tokens.extend_from_slice(ids);
        self
    }

    /// Emit `open` + `content` + `close`.
    pub fn wrapped(
        &mut self,
        open: SpecialMarker,
        content: &[TokenId],
        close: SpecialMarker,
    ) -> &mut Self {
        self.marker(open).extend(content).marker(close)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn build(self) -> TokenSequence {
        TokenSequence {
            tokens: self.tokens,
        }
    }
}
