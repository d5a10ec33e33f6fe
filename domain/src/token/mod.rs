//! Token-level value objects.
//!
//! - [`special::SpecialMarker`]: the five structural markers and their literal text
//! - [`special::SpecialTokens`]: marker ids resolved for one tokenizer
//! - [`sequence::TokenSequence`]: an immutable, framed prompt

pub mod sequence;
pub mod special;

/// Integer identifier of a single token.
pub type TokenId = u32;
