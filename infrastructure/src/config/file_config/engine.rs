//! Engine configuration from TOML (`[engine]` section)

use serde::{Deserialize, Serialize};

/// Raw engine configuration from TOML
///
/// # Example
///
/// ```toml
/// [engine]
/// corpus_path = "~/chat-corpus.txt"   # built-in corpus when unset
/// seed = 42                           # reproducible sampling
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    pub corpus_path: Option<String>,
    pub seed: Option<u64>,
}
