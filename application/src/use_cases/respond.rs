//! Respond use case.
//!
//! One call per user turn: Encode → Generate → Sanitize.
//!
//! The History passed in is only read. Committing the turn is the caller's
//! job (see [`ChatSession`](crate::session::ChatSession)), and only happens
//! when this returns `Ok`.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::generation_engine::GenerationEngine;
use crate::ports::tokenizer::Tokenizer;
use crate::ports::turn_progress::{NoTurnProgress, TurnProgressNotifier};
use crate::use_cases::encode_conversation::{ConversationEncoder, EncodingError};
use crate::use_cases::generate_reply::{GenerationDriver, GenerationError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokchat_domain::util::log_preview;
use tokchat_domain::{
    BootstrapExchange, DomainError, GenerationParams, History, Reply, SpecialTokens, sanitize,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while answering a turn.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RespondError {
    #[error("Invalid generation parameters: {0}")]
    InvalidParams(#[from] DomainError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl RespondError {
    /// Check if this error represents a cancelled turn
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RespondError::Generation(e) if e.is_cancelled())
    }

    /// Short machine-readable kind, used in transcripts.
    pub fn kind(&self) -> &'static str {
        match self {
            RespondError::InvalidParams(_) => "invalid_params",
            RespondError::Encoding(_) => "encoding",
            RespondError::Generation(GenerationError::Cancelled { .. }) => "cancelled",
            RespondError::Generation(GenerationError::Timeout { .. }) => "timeout",
            RespondError::Generation(_) => "generation",
        }
    }
}

/// Use case answering one user message.
#[derive(Clone)]
pub struct RespondUseCase {
    tokenizer: Arc<dyn Tokenizer>,
    encoder: ConversationEncoder,
    driver: GenerationDriver,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RespondUseCase {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        engine: Arc<dyn GenerationEngine>,
        specials: SpecialTokens,
    ) -> Self {
        Self {
            encoder: ConversationEncoder::new(tokenizer.clone(), specials),
            driver: GenerationDriver::new(engine),
            tokenizer,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Replace the bootstrap exchange used on the first turn.
    pub fn with_bootstrap(mut self, bootstrap: BootstrapExchange) -> Self {
        self.encoder = self.encoder.with_bootstrap(bootstrap);
        self
    }

    /// Reject prompts longer than `max` tokens.
    pub fn with_max_context(mut self, max: usize) -> Self {
        self.encoder = self.encoder.with_max_context(max);
        self
    }

    /// Fail turns whose generation runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.driver = self.driver.with_timeout(timeout);
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn encoder(&self) -> &ConversationEncoder {
        &self.encoder
    }

    /// Answer `message` given the prior `history`.
    pub fn respond(
        &self,
        history: &History,
        message: &str,
        params: &GenerationParams,
    ) -> Result<Reply, RespondError> {
        self.respond_with(
            history,
            message,
            params,
            &CancellationToken::new(),
            &NoTurnProgress,
        )
    }

    /// Answer `message` with cancellation and progress callbacks.
    pub fn respond_with(
        &self,
        history: &History,
        message: &str,
        params: &GenerationParams,
        cancel: &CancellationToken,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Reply, RespondError> {
        info!(
            "Starting turn {}: {}",
            history.len() / 2 + 1,
            log_preview(message, 80)
        );

        let result = self.run_turn(history, message, params, cancel, progress);

        match &result {
            Ok(reply) => {
                self.conversation_logger.log(ConversationEvent::new(
                    "reply_generated",
                    serde_json::json!({
                        "tokens": reply.token_count(),
                        "stop_reason": reply.stop_reason(),
                        "text": reply.text(),
                    }),
                ));
            }
            Err(e) => {
                if e.is_cancelled() {
                    info!("Turn cancelled");
                } else {
                    warn!("Turn failed: {}", e);
                }
                progress.on_generation_failed(&e.to_string());
                self.conversation_logger.log(ConversationEvent::new(
                    "turn_failed",
                    serde_json::json!({
                        "kind": e.kind(),
                        "error": e.to_string(),
                    }),
                ));
            }
        }

        result
    }

    fn run_turn(
        &self,
        history: &History,
        message: &str,
        params: &GenerationParams,
        cancel: &CancellationToken,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Reply, RespondError> {
        params.validate()?;

        let prompt = self.encoder.encode(history, message)?;
        progress.on_prompt_encoded(prompt.len());

        self.conversation_logger.log(ConversationEvent::new(
            "turn_started",
            serde_json::json!({
                "history_messages": history.len(),
                "message": message,
                "prompt_tokens": prompt.len(),
                "temperature": params.temperature,
                "top_k": params.top_k,
                "max_new_tokens": params.max_new_tokens,
            }),
        ));

        let generated = self.driver.generate(&prompt, params, cancel, progress)?;
        progress.on_generation_complete(&generated);

        let decoded = self.tokenizer.decode(generated.tokens());
        let text = sanitize(&decoded);

        debug!(
            "Reply: {} tokens -> {} chars ({:?})",
            generated.len(),
            text.len(),
            generated.stop_reason()
        );

        Ok(Reply::new(text, generated.len(), generated.stop_reason()))
    }
}
