//! Session configuration from TOML (`[session]` section)

use serde::{Deserialize, Serialize};
use tokchat_domain::BootstrapExchange;

/// Raw session configuration from TOML
///
/// # Example
///
/// ```toml
/// [session]
/// bootstrap_instruction = "You are a terse assistant."
/// bootstrap_greeting = "Hi. What do you need?"
/// context_length = 2048
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// User-side message of the priming exchange
    pub bootstrap_instruction: Option<String>,
    /// Assistant-side reply of the priming exchange
    pub bootstrap_greeting: Option<String>,
    /// Longest prompt (in tokens) sent to the engine
    pub context_length: usize,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            bootstrap_instruction: None,
            bootstrap_greeting: None,
            context_length: 2048,
        }
    }
}

impl FileSessionConfig {
    /// Build the bootstrap exchange, filling unset halves with defaults.
    pub fn bootstrap(&self) -> BootstrapExchange {
        let default = BootstrapExchange::default();
        BootstrapExchange::new(
            self.bootstrap_instruction
                .clone()
                .unwrap_or(default.instruction),
            self.bootstrap_greeting.clone().unwrap_or(default.greeting),
        )
    }
}
