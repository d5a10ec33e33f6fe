//! Domain layer for tokchat
//!
//! This crate contains the conversation entities, the token framing
//! vocabulary and the reply cleanup rules. It has no dependencies on
//! tokenizers, engines or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Framing
//!
//! A conversation is flattened into one token sequence where every turn is
//! wrapped in a pair of reserved markers:
//!
//! ```text
//! <|bos|> <|user_start|> … <|user_end|> <|assistant_start|> … <|assistant_end|> … <|assistant_start|>
//! ```
//!
//! The trailing `<|assistant_start|>` is left open; the engine continues
//! from there.
//!
//! ## Sanitizing
//!
//! Marker text that leaks into decoded output is stripped before the reply
//! is shown or stored.

pub mod config;
pub mod conversation;
pub mod core;
pub mod generation;
pub mod reply;
pub mod token;
pub mod util;

// Re-export commonly used types
pub use config::{
    OutputFormat,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use conversation::{
    bootstrap::BootstrapExchange,
    entities::{History, Message, Role},
};
pub use core::error::DomainError;
pub use generation::{
    params::GenerationParams,
    result::{GenerationResult, StopReason},
};
pub use reply::{
    entities::Reply,
    sanitizer::{contains_marker, sanitize},
};
pub use token::{
    TokenId,
    sequence::{TokenSequence, TokenSequenceBuilder},
    special::{SpecialMarker, SpecialTokens},
};
