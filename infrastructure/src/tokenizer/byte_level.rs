//! Byte-level tokenizer.
//!
//! Every byte of UTF-8 input is one token (ids 0–255). The five markers sit
//! right after the byte range. Ordinary text can never produce a marker id,
//! even if it contains the marker's literal spelling.

use tokchat_application::ports::tokenizer::{Tokenizer, TokenizerError};
use tokchat_domain::{SpecialMarker, SpecialTokens, TokenId};

/// First id after the byte range.
const SPECIAL_BASE: TokenId = 256;

/// Tokenizer mapping each byte to its own token id.
#[derive(Debug, Clone)]
pub struct ByteLevelTokenizer {
    specials: SpecialTokens,
}

impl ByteLevelTokenizer {
    pub fn new() -> Self {
        Self {
            specials: SpecialTokens {
                bos: SPECIAL_BASE,
                user_start: SPECIAL_BASE + 1,
                user_end: SPECIAL_BASE + 2,
                assistant_start: SPECIAL_BASE + 3,
                assistant_end: SPECIAL_BASE + 4,
            },
        }
    }

    /// Total number of ids this tokenizer can produce.
    pub fn vocab_size(&self) -> usize {
        SPECIAL_BASE as usize + SpecialMarker::ALL.len()
    }
}

impl Default for ByteLevelTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for ByteLevelTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        Ok(text.bytes().map(TokenId::from).collect())
    }

    fn decode(&self, ids: &[TokenId]) -> String {
        let mut out = String::with_capacity(ids.len());
        let mut pending: Vec<u8> = Vec::new();

        for &id in ids {
            if let Ok(byte) = u8::try_from(id) {
                pending.push(byte);
                continue;
            }
            out.push_str(&String::from_utf8_lossy(&pending));
            pending.clear();
            match self.specials.marker(id) {
                Some(marker) => out.push_str(marker.literal()),
                None => out.push(char::REPLACEMENT_CHARACTER),
            }
        }
        out.push_str(&String::from_utf8_lossy(&pending));
        out
    }

    fn resolve_special(&self, literal: &str) -> Result<TokenId, TokenizerError> {
        SpecialMarker::from_literal(literal)
            .map(|marker| self.specials.id(marker))
            .ok_or_else(|| TokenizerError::UnknownSpecial(literal.to_string()))
    }

    fn bos_token_id(&self) -> TokenId {
        self.specials.bos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_utf8_bytes() {
        let tok = ByteLevelTokenizer::new();
        assert_eq!(tok.encode("hi").unwrap(), vec![104, 105]);
        assert_eq!(tok.encode("é").unwrap(), vec![0xc3, 0xa9]);
        assert!(tok.encode("").unwrap().is_empty());
    }

    #[test]
    fn roundtrips_text_including_multibyte() {
        let tok = ByteLevelTokenizer::new();
        let text = "Grüße, 世界! 👋";
        assert_eq!(tok.decode(&tok.encode(text).unwrap()), text);
    }

    #[test]
    fn literal_marker_text_is_not_a_marker_id() {
        let tok = ByteLevelTokenizer::new();
        let ids = tok.encode("<|bos|>").unwrap();
        assert_eq!(ids.len(), "<|bos|>".len());
        assert!(ids.iter().all(|&id| id < 256));
    }

    #[test]
    fn markers_decode_to_literals() {
        let tok = ByteLevelTokenizer::new();
        let assistant_start = tok.resolve_special("<|assistant_start|>").unwrap();
        let assistant_end = tok.resolve_special("<|assistant_end|>").unwrap();
        let mut ids = vec![assistant_start];
        ids.extend(tok.encode("Hello").unwrap());
        ids.push(assistant_end);

        assert_eq!(
            tok.decode(&ids),
            "<|assistant_start|>Hello<|assistant_end|>"
        );
    }

    #[test]
    fn resolves_every_marker_to_distinct_ids() {
        let tok = ByteLevelTokenizer::new();
        let mut ids: Vec<TokenId> = SpecialMarker::ALL
            .iter()
            .map(|m| tok.resolve_special(m.literal()).unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(tok.bos_token_id(), 256);
        assert_eq!(tok.vocab_size(), 261);
    }

    #[test]
    fn unknown_special_is_an_error() {
        let tok = ByteLevelTokenizer::new();
        assert_eq!(
            tok.resolve_special("<|im_start|>"),
            Err(TokenizerError::UnknownSpecial("<|im_start|>".to_string()))
        );
    }

    #[test]
    fn out_of_range_ids_become_replacement_chars() {
        let tok = ByteLevelTokenizer::new();
        assert_eq!(tok.decode(&[104, 9999, 105]), "h\u{FFFD}i");
    }
}
