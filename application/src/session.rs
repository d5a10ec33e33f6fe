//! Per-session chat context.
//!
//! A [`ChatSession`] owns one conversation's [`History`] and its generation
//! parameters. Sessions share nothing mutable; the only state common to all
//! of them is the read-only [`SpecialTokens`](tokchat_domain::SpecialTokens)
//! held inside the [`RespondUseCase`].

use crate::ports::turn_progress::TurnProgressNotifier;
use crate::use_cases::respond::{RespondError, RespondUseCase};
use tokchat_domain::{GenerationParams, History, Reply};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One conversation.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    history: History,
    params: GenerationParams,
}

impl ChatSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history: History::new(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn set_params(&mut self, params: GenerationParams) {
        self.params = params;
    }

    /// Number of completed turns.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    /// Run one turn and commit it on success.
    pub fn send(
        &mut self,
        use_case: &RespondUseCase,
        message: &str,
        cancel: &CancellationToken,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Reply, RespondError> {
        let reply = use_case.respond_with(&self.history, message, &self.params, cancel, progress)?;
        self.record_turn(message, &reply);
        Ok(reply)
    }

    /// Commit a turn produced elsewhere (e.g. on a worker thread).
    ///
    /// Appends exactly one user message and one assistant message.
    pub fn record_turn(&mut self, message: &str, reply: &Reply) {
        self.history.push_turn(message, reply.text());
        debug!("Session {}: committed turn {}", self.id, self.turns());
    }

    /// Discard the History; the next turn starts from the bootstrap exchange.
    pub fn reset(&mut self) {
        self.history = History::new();
    }
}
