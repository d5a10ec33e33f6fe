//! Infrastructure layer for tokchat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod engine;
pub mod logging;
pub mod runtime;
pub mod tokenizer;

// Re-export commonly used types
pub use config::{ConfigLoadError, ConfigLoader, FileConfig, expand_path};
pub use engine::{BigramEngine, CorpusError, TrainingError};
pub use logging::JsonlTranscriptLogger;
pub use runtime::{ChatRuntime, RuntimeError};
pub use tokenizer::{ByteLevelTokenizer, TokenizerKind, VocabError, VocabTokenizer};
