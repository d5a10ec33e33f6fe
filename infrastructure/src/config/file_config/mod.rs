//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod engine;
mod generation;
mod logging;
mod output;
mod repl;
mod session;
mod tokenizer;

pub use engine::FileEngineConfig;
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use repl::FileReplConfig;
pub use session::FileSessionConfig;
pub use tokenizer::FileTokenizerConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokchat_domain::config::validation::{ConfigIssue, ConfigIssueCode};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Sampling parameters
    pub generation: FileGenerationConfig,
    /// Bootstrap exchange and context length
    pub session: FileSessionConfig,
    /// Tokenizer selection
    pub tokenizer: FileTokenizerConfig,
    /// Engine training and seeding
    pub engine: FileEngineConfig,
    /// JSONL transcript
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors mean the configuration cannot be used; warnings describe a
    /// fallback or an unusual value.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.generation.to_params().1);
        issues.extend(self.tokenizer.resolve().1);

        if self.session.context_length == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidGenerationParam {
                    field: "session.context_length".to_string(),
                },
                "session.context_length: must be >= 1",
            ));
        } else if self.session.context_length <= self.generation.max_new_tokens {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRecommendedRange {
                    field: "session.context_length".to_string(),
                },
                format!(
                    "session.context_length ({}) leaves no room for max_new_tokens ({})",
                    self.session.context_length, self.generation.max_new_tokens
                ),
            ));
        }

        issues
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
