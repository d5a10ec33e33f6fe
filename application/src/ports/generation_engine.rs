//! Generation engine port
//!
//! The engine is consumed as a pull-based, one-shot stream: every call to
//! [`GenerationEngine::generate`] returns a fresh [`TokenStream`] that yields
//! one [`GenerationStep`] per generation step until it is exhausted.
//! Pulling a step may block on model computation.

use thiserror::Error;
use tokchat_domain::{TokenId, TokenSequence};

/// Errors that can occur inside the generation engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Engine fault at step {step}: {message}")]
    Fault { step: usize, message: String },

    #[error("Engine error: {0}")]
    Other(String),
}

/// A request for one generation pass.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a TokenSequence,
    /// Number of parallel samples; the respond flow always uses 1.
    pub num_samples: usize,
    /// Maximum steps the engine may produce.
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_k: usize,
}

/// Output of one generation step: a token per sample and whether that
/// sample was still active when the token was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationStep {
    pub tokens: Vec<TokenId>,
    pub mask: Vec<bool>,
}

impl GenerationStep {
    /// A step for a single sample.
    pub fn single(token: TokenId) -> Self {
        Self {
            tokens: vec![token],
            mask: vec![true],
        }
    }

    /// Token for the given sample, if present.
    pub fn token(&self, sample: usize) -> Option<TokenId> {
        self.tokens.get(sample).copied()
    }

    /// Whether the given sample was still active at this step.
    pub fn is_valid(&self, sample: usize) -> bool {
        self.mask.get(sample).copied().unwrap_or(false)
    }
}

/// Lazy, finite, one-shot stream of generation steps.
pub type TokenStream<'a> = Box<dyn Iterator<Item = Result<GenerationStep, EngineError>> + Send + 'a>;

/// Autoregressive text-generation capability.
pub trait GenerationEngine: Send + Sync {
    /// Start a generation pass.
    ///
    /// Errors returned here mean the pass never started; errors yielded by
    /// the stream are faults after it started.
    fn generate<'a>(&'a self, request: GenerationRequest<'a>)
    -> Result<TokenStream<'a>, EngineError>;
}
