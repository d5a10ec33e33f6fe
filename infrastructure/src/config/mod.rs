//! Configuration file loading for tokchat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `TOKCHAT_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./tokchat.toml` or `./.tokchat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/tokchat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileEngineConfig, FileGenerationConfig, FileLoggingConfig, FileOutputConfig,
    FileReplConfig, FileSessionConfig, FileTokenizerConfig, expand_path,
};
pub use loader::{ConfigLoadError, ConfigLoader};
