//! Tokenizer adapters.
//!
//! - [`ByteLevelTokenizer`]: one token per UTF-8 byte, no files needed
//! - [`VocabTokenizer`]: greedy longest match over a JSON vocabulary

mod byte_level;
mod vocab;

pub use byte_level::ByteLevelTokenizer;
pub use vocab::{VocabError, VocabTokenizer};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokchat_application::ports::tokenizer::Tokenizer;

/// Which tokenizer adapter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Byte,
    Vocab,
}

impl TokenizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenizerKind::Byte => "byte",
            TokenizerKind::Vocab => "vocab",
        }
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "byte" | "bytes" => Ok(TokenizerKind::Byte),
            "vocab" | "vocabulary" => Ok(TokenizerKind::Vocab),
            other => Err(format!("unknown tokenizer kind: {other}")),
        }
    }
}

/// A built tokenizer together with the id range it can emit.
pub struct BuiltTokenizer {
    pub tokenizer: Arc<dyn Tokenizer>,
    /// Upper bound (exclusive) on token ids, used to size the engine tables.
    pub id_bound: usize,
}

/// Build the configured tokenizer.
///
/// `Vocab` without a path falls back to the byte-level tokenizer; config
/// validation already warns about that combination.
pub fn build_tokenizer(
    kind: TokenizerKind,
    vocab_path: Option<&Path>,
) -> Result<BuiltTokenizer, VocabError> {
    match (kind, vocab_path) {
        (TokenizerKind::Vocab, Some(path)) => {
            let tokenizer = VocabTokenizer::from_file(path)?;
            let id_bound = tokenizer.id_bound();
            Ok(BuiltTokenizer {
                tokenizer: Arc::new(tokenizer),
                id_bound,
            })
        }
        _ => {
            let tokenizer = ByteLevelTokenizer::new();
            let id_bound = tokenizer.vocab_size();
            Ok(BuiltTokenizer {
                tokenizer: Arc::new(tokenizer),
                id_bound,
            })
        }
    }
}
