//! Vocabulary-file tokenizer.
//!
//! Loads a JSON vocabulary and encodes by greedy longest match:
//!
//! ```json
//! {
//!   "bos": "<|bos|>",
//!   "special": { "<|bos|>": 0, "<|user_start|>": 1, "...": 2 },
//!   "vocab": { "hello": 10, " ": 11, "h": 12 }
//! }
//! ```
//!
//! Text containing a character that no vocabulary piece covers cannot be
//! encoded and is reported as [`TokenizerError::UnencodableText`].

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokchat_application::ports::tokenizer::{Tokenizer, TokenizerError};
use tokchat_domain::TokenId;
use tracing::info;

/// Errors that can occur while loading a vocabulary file
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Failed to read vocabulary file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse vocabulary: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid vocabulary: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct VocabFile {
    bos: String,
    special: HashMap<String, TokenId>,
    vocab: HashMap<String, TokenId>,
}

/// Greedy longest-match tokenizer over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct VocabTokenizer {
    pieces: HashMap<String, TokenId>,
    special: HashMap<String, TokenId>,
    id_to_text: HashMap<TokenId, String>,
    bos: TokenId,
    max_piece_chars: usize,
}

impl VocabTokenizer {
    /// Load a vocabulary from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VocabError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| VocabError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tokenizer = Self::from_json(&json)?;
        info!(
            "Loaded vocabulary from {} ({} pieces, {} special)",
            path.display(),
            tokenizer.pieces.len(),
            tokenizer.special.len()
        );
        Ok(tokenizer)
    }

    /// Load a vocabulary from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, VocabError> {
        let file: VocabFile = serde_json::from_str(json)?;

        let bos = *file.special.get(&file.bos).ok_or_else(|| {
            VocabError::Invalid(format!("bos token {} is not in \"special\"", file.bos))
        })?;

        let mut id_to_text = HashMap::new();
        for (text, &id) in file.vocab.iter().chain(file.special.iter()) {
            if text.is_empty() {
                return Err(VocabError::Invalid("empty piece".to_string()));
            }
            if let Some(existing) = id_to_text.insert(id, text.clone()) {
                return Err(VocabError::Invalid(format!(
                    "id {id} is used by both {existing:?} and {text:?}"
                )));
            }
        }

        let max_piece_chars = file
            .vocab
            .keys()
            .map(|p| p.chars().count())
            .max()
            .unwrap_or(0);

        Ok(Self {
            pieces: file.vocab,
            special: file.special,
            id_to_text,
            bos,
            max_piece_chars,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.id_to_text.len()
    }

    /// Largest id in the vocabulary plus one.
    pub fn id_bound(&self) -> usize {
        self.id_to_text
            .keys()
            .max()
            .map(|&id| id as usize + 1)
            .unwrap_or(0)
    }
}

impl Tokenizer for VocabTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        let mut ids = Vec::new();
        let mut start = 0usize;
        let chars = bounds.len() - 1;

        while start < chars {
            let longest = self.max_piece_chars.min(chars - start);
            let matched = (1..=longest).rev().find_map(|len| {
                let piece = &text[bounds[start]..bounds[start + len]];
                self.pieces.get(piece).map(|&id| (id, len))
            });

            match matched {
                Some((id, len)) => {
                    ids.push(id);
                    start += len;
                }
                None => {
                    let ch = &text[bounds[start]..bounds[start + 1]];
                    return Err(TokenizerError::UnencodableText(format!(
                        "no vocabulary piece covers {ch:?} at character {start}"
                    )));
                }
            }
        }

        Ok(ids)
    }

    fn decode(&self, ids: &[TokenId]) -> String {
        ids.iter()
            .map(|id| {
                self.id_to_text
                    .get(id)
                    .map(String::as_str)
                    .unwrap_or("\u{FFFD}")
            })
            .collect()
    }

    fn resolve_special(&self, literal: &str) -> Result<TokenId, TokenizerError> {
        self.special
            .get(literal)
            .copied()
            .ok_or_else(|| TokenizerError::UnknownSpecial(literal.to_string()))
    }

    fn bos_token_id(&self) -> TokenId {
        self.bos
    }
}
