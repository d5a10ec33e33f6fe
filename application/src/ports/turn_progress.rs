//! Turn progress port.
//!
//! [`TurnProgressNotifier`] is an **output port** that the presentation layer
//! implements to show a turn while it runs (spinners, live token counts).
//! Callbacks are informational only and cannot change the outcome.
//!
//! All methods have default no-op implementations.

use tokchat_domain::{GenerationResult, TokenId};

pub trait TurnProgressNotifier: Send + Sync {
    /// Called once the prompt is encoded, before the engine is started.
    fn on_prompt_encoded(&self, _prompt_tokens: usize) {}

    /// Called after each token is accumulated; `count` is the running total.
    fn on_token(&self, _token: TokenId, _count: usize) {}

    /// Called when generation finished successfully.
    fn on_generation_complete(&self, _result: &GenerationResult) {}

    /// Called when the turn failed or was cancelled.
    fn on_generation_failed(&self, _error: &str) {}
}

/// Progress notifier that ignores every callback.
pub struct NoTurnProgress;

impl TurnProgressNotifier for NoTurnProgress {}
