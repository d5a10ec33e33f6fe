//! Generation configuration from TOML (`[generation]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokchat_domain::GenerationParams;
use tokchat_domain::config::validation::{ConfigIssue, ConfigIssueCode};

/// Recommended tuning ranges; values outside still work.
const TEMPERATURE_RANGE: (f32, f32) = (0.0, 1.5);
const TOP_K_RANGE: (usize, usize) = (1, 200);
const MAX_NEW_TOKENS_RANGE: (usize, usize) = (8, 1024);

/// Raw generation configuration from TOML
///
/// # Example
///
/// ```toml
/// [generation]
/// temperature = 0.8        # 0 = greedy
/// top_k = 50
/// max_new_tokens = 256
/// timeout_seconds = 30     # optional
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub temperature: f32,
    pub top_k: usize,
    pub max_new_tokens: usize,
    /// Abort a turn that runs longer than this
    pub timeout_seconds: Option<u64>,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            temperature: params.temperature,
            top_k: params.top_k,
            max_new_tokens: params.max_new_tokens,
            timeout_seconds: None,
        }
    }
}

impl FileGenerationConfig {
    /// Convert into domain params, collecting every problem found.
    pub fn to_params(&self) -> (GenerationParams, Vec<ConfigIssue>) {
        let params = GenerationParams {
            temperature: self.temperature,
            top_k: self.top_k,
            max_new_tokens: self.max_new_tokens,
        };
        let mut issues = Vec::new();

        if !self.temperature.is_finite() || self.temperature < 0.0 {
            issues.push(invalid(
                "generation.temperature",
                format!("must be a finite value >= 0, got {}", self.temperature),
            ));
        } else if self.temperature > TEMPERATURE_RANGE.1 {
            issues.push(out_of_range(
                "generation.temperature",
                self.temperature,
                TEMPERATURE_RANGE,
            ));
        }

        if self.top_k == 0 {
            issues.push(invalid("generation.top_k", "must be >= 1, got 0".to_string()));
        } else if self.top_k > TOP_K_RANGE.1 {
            issues.push(out_of_range("generation.top_k", self.top_k, TOP_K_RANGE));
        }

        if self.max_new_tokens == 0 {
            issues.push(invalid(
                "generation.max_new_tokens",
                "must be >= 1, got 0".to_string(),
            ));
        } else if self.max_new_tokens < MAX_NEW_TOKENS_RANGE.0
            || self.max_new_tokens > MAX_NEW_TOKENS_RANGE.1
        {
            issues.push(out_of_range(
                "generation.max_new_tokens",
                self.max_new_tokens,
                MAX_NEW_TOKENS_RANGE,
            ));
        }

        if self.timeout_seconds == Some(0) {
            issues.push(invalid(
                "generation.timeout_seconds",
                "must be >= 1 when set".to_string(),
            ));
        }

        (params, issues)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

fn invalid(field: &str, detail: String) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::InvalidGenerationParam {
            field: field.to_string(),
        },
        format!("{field}: {detail}"),
    )
}

fn out_of_range<T: std::fmt::Display>(field: &str, value: T, range: (T, T)) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::OutOfRecommendedRange {
            field: field.to_string(),
        },
        format!(
            "{field}: {value} is outside the recommended range {}..={}",
            range.0, range.1
        ),
    )
}
