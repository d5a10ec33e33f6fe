//! Conversation encoder.
//!
//! Flattens a [`History`] plus the new user message into the framed prompt
//! the engine continues from:
//!
//! ```text
//! bos
//! [user_start <instruction> user_end assistant_start <greeting> assistant_end]   (empty History only)
//! (user_start <user> user_end | assistant_start <assistant> assistant_end)*     (History, in order)
//! user_start <message> user_end
//! assistant_start                                                              (left open)
//! ```

use crate::ports::tokenizer::{Tokenizer, TokenizerError};
use std::sync::Arc;
use thiserror::Error;
use tokchat_domain::{
    BootstrapExchange, History, Role, SpecialMarker, SpecialTokens, TokenId, TokenSequence,
    TokenSequenceBuilder,
};
use tracing::debug;

/// Errors that can occur while encoding a conversation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Failed to encode {role} message: {source}")]
    Tokenizer {
        role: Role,
        #[source]
        source: TokenizerError,
    },

    #[error("Prompt is {len} tokens, exceeding the context length of {max}")]
    ContextOverflow { len: usize, max: usize },
}

/// Serializes conversations into framed token sequences.
///
/// Pure: the same History and message always produce the same sequence.
#[derive(Clone)]
pub struct ConversationEncoder {
    tokenizer: Arc<dyn Tokenizer>,
    specials: SpecialTokens,
    bootstrap: BootstrapExchange,
    max_context: Option<usize>,
}

impl ConversationEncoder {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, specials: SpecialTokens) -> Self {
        Self {
            tokenizer,
            specials,
            bootstrap: BootstrapExchange::default(),
            max_context: None,
        }
    }

    /// Replace the bootstrap exchange used for empty histories.
    pub fn with_bootstrap(mut self, bootstrap: BootstrapExchange) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Reject prompts longer than `max` tokens instead of passing them on.
    pub fn with_max_context(mut self, max: usize) -> Self {
        self.max_context = Some(max);
        self
    }

    pub fn specials(&self) -> SpecialTokens {
        self.specials
    }

    pub fn bootstrap(&self) -> &BootstrapExchange {
        &self.bootstrap
    }

    /// Encode `history` followed by the new user `message`.
    pub fn encode(&self, history: &History, message: &str) -> Result<TokenSequence, EncodingError> {
        let mut builder = TokenSequenceBuilder::new(self.specials);
        builder.marker(SpecialMarker::Bos);

        if history.is_empty() {
            let instruction = self.encode_text(Role::User, &self.bootstrap.instruction)?;
            let greeting = self.encode_text(Role::Assistant, &self.bootstrap.greeting)?;
            builder
                .wrapped(SpecialMarker::UserStart, &instruction, SpecialMarker::UserEnd)
                .wrapped(
                    SpecialMarker::AssistantStart,
                    &greeting,
                    SpecialMarker::AssistantEnd,
                );
        }

        for msg in history {
            let content = self.encode_text(msg.role, &msg.content)?;
            let (open, close) = Self::delimiters(msg.role);
            builder.wrapped(open, &content, close);
        }

        let content = self.encode_text(Role::User, message)?;
        builder
            .wrapped(SpecialMarker::UserStart, &content, SpecialMarker::UserEnd)
            .marker(SpecialMarker::AssistantStart);

        let sequence = builder.build();

        if let Some(max) = self.max_context
            && sequence.len() > max
        {
            return Err(EncodingError::ContextOverflow {
                len: sequence.len(),
                max,
            });
        }

        debug!(
            "Encoded {} history messages into {} prompt tokens",
            history.len(),
            sequence.len()
        );

        Ok(sequence)
    }

    fn encode_text(&self, role: Role, text: &str) -> Result<Vec<TokenId>, EncodingError> {
        self.tokenizer
            .encode(text)
            .map_err(|source| EncodingError::Tokenizer { role, source })
    }

    fn delimiters(role: Role) -> (SpecialMarker, SpecialMarker) {
        match role {
            Role::User => (SpecialMarker::UserStart, SpecialMarker::UserEnd),
            Role::Assistant => (SpecialMarker::AssistantStart, SpecialMarker::AssistantEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{ByteTokenizer, specials};
    use tokchat_domain::Message;

    fn encoder() -> ConversationEncoder {
        ConversationEncoder::new(Arc::new(ByteTokenizer::new()), specials())
    }

    fn pairs_in_order(seq: &TokenSequence, open: u32, close: u32) -> bool {
        let mut open_count = 0usize;
        for id in seq.iter() {
            if id == open {
                if open_count > 0 {
                    return false;
                }
                open_count += 1;
            } else if id == close {
                if open_count == 0 {
                    return false;
                }
                open_count -= 1;
            }
        }
        open_count == 0
    }

    #[test]
    fn empty_history_gets_bootstrap_exchange() {
        let s = specials();
        let seq = encoder().encode(&History::new(), "hi").unwrap();

        assert_eq!(seq.first(), Some(s.bos));
        assert_eq!(seq.last(), Some(s.assistant_start));
        assert_eq!(seq.count(s.user_start), 2);
        assert_eq!(seq.count(s.user_end), 2);
        // bootstrap greeting pair + trailing open marker
        assert_eq!(seq.count(s.assistant_start), 2);
        assert_eq!(seq.count(s.assistant_end), 1);
        assert_eq!(seq.count(s.bos), 1);
    }

    #[test]
    fn empty_history_layout_is_exact() {
        let s = specials();
        let bootstrap = BootstrapExchange::new("sys", "hey");
        let seq = encoder()
            .with_bootstrap(bootstrap)
            .encode(&History::new(), "hi")
            .unwrap();

        let mut expected = vec![s.bos, s.user_start];
        expected.extend(b"sys".iter().map(|&b| u32::from(b)));
        expected.extend([s.user_end, s.assistant_start]);
        expected.extend(b"hey".iter().map(|&b| u32::from(b)));
        expected.extend([s.assistant_end, s.user_start]);
        expected.extend(b"hi".iter().map(|&b| u32::from(b)));
        expected.extend([s.user_end, s.assistant_start]);

        assert_eq!(seq.as_slice(), expected.as_slice());
    }

    #[test]
    fn non_empty_history_skips_bootstrap() {
        let s = specials();
        let mut history = History::new();
        history.push_turn("hello", "hi there");

        let seq = encoder().encode(&history, "how are you?").unwrap();

        assert_eq!(seq.first(), Some(s.bos));
        assert_eq!(seq.last(), Some(s.assistant_start));
        assert_eq!(seq.count(s.user_start), 2);
        assert_eq!(seq.count(s.user_end), 2);
        assert_eq!(seq.count(s.assistant_end), 1);

        let text = ByteTokenizer::new().decode(seq.as_slice());
        assert!(!text.contains("helpful AI assistant"));
        assert!(text.contains("hello"));
        assert!(text.contains("hi there"));
    }

    #[test]
    fn framing_invariant_holds_for_longer_histories() {
        let s = specials();
        let history = History::from(vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
            Message::assistant(""),
            Message::user(""),
            Message::assistant("six"),
        ]);

        let seq = encoder().encode(&history, "seven").unwrap();
        let user_messages = history.count_role(Role::User) + 1;

        assert_eq!(seq.first(), Some(s.bos));
        assert_eq!(seq.last(), Some(s.assistant_start));
        assert_eq!(seq.count(s.user_start), user_messages);
        assert_eq!(seq.count(s.user_end), user_messages);
        assert_eq!(seq.count(s.assistant_end), history.count_role(Role::Assistant));
        assert!(pairs_in_order(&seq, s.user_start, s.user_end));
    }

    #[test]
    fn messages_keep_chronological_order() {
        let history = History::from(vec![Message::user("first"), Message::assistant("second")]);
        let seq = encoder().encode(&history, "third").unwrap();
        let text = ByteTokenizer::new().decode(seq.as_slice());

        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        let third = text.find("third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn single_message_content_roundtrips() {
        let s = specials();
        let tokenizer = ByteTokenizer::new();
        let content = "Round trip: ünïcödé & symbols <| not a marker";
        let history = History::from(vec![Message::user(content)]);

        let seq = encoder().encode(&history, "next").unwrap();
        let ids = seq.as_slice();
        let start = ids.iter().position(|&t| t == s.user_start).unwrap() + 1;
        let end = ids.iter().position(|&t| t == s.user_end).unwrap();

        assert_eq!(tokenizer.decode(&ids[start..end]), content);
    }

    #[test]
    fn tokenizer_failure_is_encoding_error() {
        let err = encoder().encode(&History::new(), "bad \u{0}").unwrap_err();
        assert!(matches!(
            err,
            EncodingError::Tokenizer {
                role: Role::User,
                ..
            }
        ));
    }

    #[test]
    fn failure_in_history_reports_role() {
        let history = History::from(vec![Message::user("ok"), Message::assistant("\u{0}")]);
        let err = encoder().encode(&history, "fine").unwrap_err();
        assert!(matches!(
            err,
            EncodingError::Tokenizer {
                role: Role::Assistant,
                ..
            }
        ));
    }

    #[test]
    fn context_overflow_is_reported_not_truncated() {
        let mut history = History::new();
        history.push_turn("a".repeat(40), "b".repeat(40));

        let err = encoder()
            .with_max_context(32)
            .encode(&history, "more")
            .unwrap_err();

        match err {
            EncodingError::ContextOverflow { len, max } => {
                assert_eq!(max, 32);
                assert!(len > 80);
            }
            other => panic!("Expected ContextOverflow, got {other:?}"),
        }
    }

    #[test]
    fn prompt_within_context_passes() {
        let seq = encoder()
            .with_bootstrap(BootstrapExchange::new("", ""))
            .with_max_context(12)
            .encode(&History::new(), "hi")
            .unwrap();
        assert_eq!(seq.len(), 10);
    }
}
