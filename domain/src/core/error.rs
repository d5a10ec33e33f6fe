//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid temperature: {0} (must be a finite value >= 0)")]
    InvalidTemperature(f32),

    #[error("Invalid top_k: {0} (must be >= 1)")]
    InvalidTopK(usize),

    #[error("Invalid max_new_tokens: {0} (must be >= 1)")]
    InvalidMaxNewTokens(usize),
}
