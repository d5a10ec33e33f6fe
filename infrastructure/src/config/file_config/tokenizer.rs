//! Tokenizer configuration from TOML (`[tokenizer]` section)

use crate::tokenizer::TokenizerKind;
use serde::{Deserialize, Serialize};
use tokchat_domain::config::validation::{ConfigIssue, ConfigIssueCode};

/// Raw tokenizer configuration from TOML
///
/// # Example
///
/// ```toml
/// [tokenizer]
/// kind = "vocab"                  # "byte" or "vocab"
/// vocab_path = "~/models/vocab.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTokenizerConfig {
    pub kind: String,
    /// JSON vocabulary, required when `kind = "vocab"`
    pub vocab_path: Option<String>,
}

impl Default for FileTokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::Byte.as_str().to_string(),
            vocab_path: None,
        }
    }
}

impl FileTokenizerConfig {
    /// Parse `kind`, falling back to the byte tokenizer with a warning.
    pub fn parse_kind(&self) -> (TokenizerKind, Vec<ConfigIssue>) {
        match self.kind.parse::<TokenizerKind>() {
            Ok(kind) => (kind, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "tokenizer.kind".to_string(),
                        value: self.kind.clone(),
                        valid_values: vec!["byte".to_string(), "vocab".to_string()],
                    },
                    format!(
                        "tokenizer.kind: unknown value '{}', falling back to 'byte'",
                        self.kind
                    ),
                );
                (TokenizerKind::Byte, vec![issue])
            }
        }
    }

    /// The kind that will actually be built, plus any issues.
    ///
    /// `vocab` without `vocab_path` degrades to `byte`.
    pub fn resolve(&self) -> (TokenizerKind, Vec<ConfigIssue>) {
        let (kind, mut issues) = self.parse_kind();
        if kind == TokenizerKind::Vocab && self.vocab_path.is_none() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingDependency {
                    field: "tokenizer.kind".to_string(),
                    requires: "tokenizer.vocab_path".to_string(),
                },
                "tokenizer.kind = \"vocab\" needs tokenizer.vocab_path, falling back to 'byte'",
            ));
            return (TokenizerKind::Byte, issues);
        }
        (kind, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_byte() {
        let (kind, issues) = FileTokenizerConfig::default().resolve();
        assert_eq!(kind, TokenizerKind::Byte);
        assert!(issues.is_empty());
    }

    #[test]
    fn unknown_kind_warns() {
        let config = FileTokenizerConfig {
            kind: "bpe".to_string(),
            vocab_path: None,
        };
        let (kind, issues) = config.parse_kind();
        assert_eq!(kind, TokenizerKind::Byte);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn vocab_requires_path() {
        let mut config = FileTokenizerConfig {
            kind: "vocab".to_string(),
            vocab_path: None,
        };
        let (kind, issues) = config.resolve();
        assert_eq!(kind, TokenizerKind::Byte);
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::MissingDependency { .. }
        ));

        config.vocab_path = Some("vocab.json".to_string());
        let (kind, issues) = config.resolve();
        assert_eq!(kind, TokenizerKind::Vocab);
        assert!(issues.is_empty());
    }
}
