//! Generation parameters.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Sampling parameters for one turn.
///
/// `temperature` and `top_k` are handed to the engine verbatim; only the
/// bounds below are checked here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature, `>= 0` (0 = greedy).
    pub temperature: f32,
    /// Number of most likely candidates kept when sampling, `>= 1`.
    pub top_k: usize,
    /// Hard ceiling on generated tokens, `>= 1`.
    pub max_new_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_k: 50,
            max_new_tokens: 256,
        }
    }
}

impl GenerationParams {
    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_new_tokens(mut self, max: usize) -> Self {
        self.max_new_tokens = max;
        self
    }

    /// Check the contract bounds.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(DomainError::InvalidTemperature(self.temperature));
        }
        if self.top_k < 1 {
            return Err(DomainError::InvalidTopK(self.top_k));
        }
        if self.max_new_tokens < 1 {
            return Err(DomainError::InvalidMaxNewTokens(self.max_new_tokens));
        }
        Ok(())
    }
}
