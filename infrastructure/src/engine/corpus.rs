//! Plain-text training corpus.
//!
//! ```text
//! # comment
//! user: Hello
//! assistant: Hello! How can I help you today?
//!
//! user: Bye
//! assistant: Goodbye!
//! ```
//!
//! Blank lines separate conversations. Each conversation must alternate
//! user and assistant messages, starting with the user.

use std::path::Path;
use thiserror::Error;
use tokchat_domain::{History, Message, Role};

/// Conversations shipped with the binary.
pub const BUILTIN_CORPUS: &str = include_str!("../../assets/corpus.txt");

/// Errors that can occur while reading a corpus
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corpus line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Corpus contains no conversations")]
    Empty,
}

/// Read and parse a corpus file.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<History>, CorpusError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_corpus(&text)
}

/// Parse corpus text into conversations.
pub fn parse_corpus(text: &str) -> Result<Vec<History>, CorpusError> {
    let mut conversations = Vec::new();
    let mut current: Vec<Message> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            if !current.is_empty() {
                conversations.push(History::from(std::mem::take(&mut current)));
            }
            continue;
        }

        let (role, content) = parse_line(line).ok_or_else(|| CorpusError::Parse {
            line: line_no,
            message: "expected \"user:\" or \"assistant:\" prefix".to_string(),
        })?;

        let expected = if current.len() % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        if role != expected {
            return Err(CorpusError::Parse {
                line: line_no,
                message: format!("expected a {expected} message, found {role}"),
            });
        }

        current.push(Message {
            role,
            content: content.to_string(),
        });
    }

    if !current.is_empty() {
        conversations.push(History::from(current));
    }

    if conversations.is_empty() {
        return Err(CorpusError::Empty);
    }
    Ok(conversations)
}

fn parse_line(line: &str) -> Option<(Role, &str)> {
    if let Some(rest) = line.strip_prefix("user:") {
        Some((Role::User, rest.trim()))
    } else {
        line.strip_prefix("assistant:")
            .map(|rest| (Role::Assistant, rest.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_corpus_parses() {
        let conversations = parse_corpus(BUILTIN_CORPUS).unwrap();
        assert!(conversations.len() > 10);
        for history in &conversations {
            assert_eq!(history.messages()[0].role, Role::User);
        }
    }

    #[test]
    fn splits_on_blank_lines_and_skips_comments() {
        let text = "# header\nuser: a\nassistant: b\n\n\nuser: c\nassistant: d\nuser: e\n";
        let conversations = parse_corpus(text).unwrap();

        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].len(), 2);
        assert_eq!(conversations[1].len(), 3);
        assert_eq!(conversations[1].messages()[2].content, "e");
    }

    #[test]
    fn rejects_unknown_prefix() {
        let err = parse_corpus("user: hi\nbot: hello\n").unwrap_err();
        assert!(matches!(err, CorpusError::Parse { line: 2, .. }));
    }

    #[test]
    fn rejects_out_of_order_roles() {
        let err = parse_corpus("assistant: hello\n").unwrap_err();
        assert!(matches!(err, CorpusError::Parse { line: 1, .. }));
    }

    #[test]
    fn empty_corpus_is_an_error() {
        assert!(matches!(parse_corpus("# nothing\n\n"), Err(CorpusError::Empty)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "user: ping\nassistant: pong\n").unwrap();

        let conversations = load_corpus(&path).unwrap();
        assert_eq!(conversations.len(), 1);
    }
}
