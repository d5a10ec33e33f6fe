//! Tokenizer port
//!
//! Defines the text <-> token capability the encoder and the sanitizer
//! consume. Implementations must be deterministic and side-effect free.

use thiserror::Error;
use tokchat_domain::TokenId;

/// Errors that can occur at the tokenizer boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("Text cannot be encoded: {0}")]
    UnencodableText(String),

    #[error("Unknown special token: {0}")]
    UnknownSpecial(String),

    #[error("Tokenizer error: {0}")]
    Other(String),
}

/// Text/token conversion capability.
///
/// `encode` never produces special-token ids from ordinary text; the only
/// way to obtain them is [`resolve_special`](Tokenizer::resolve_special).
pub trait Tokenizer: Send + Sync {
    /// Convert text to token ids.
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError>;

    /// Convert token ids back to text.
    ///
    /// Special tokens may be rendered as their literal text.
    fn decode(&self, ids: &[TokenId]) -> String;

    /// Id of the special token written as `literal` (e.g. `<|user_start|>`).
    fn resolve_special(&self, literal: &str) -> Result<TokenId, TokenizerError>;

    /// Id of the beginning-of-sequence token.
    fn bos_token_id(&self) -> TokenId;
}
