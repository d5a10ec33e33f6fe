//! Generation driver.
//!
//! Pulls tokens from the engine's stream for a single sample until the
//! stream ends or `max_new_tokens` tokens were accumulated. The driver does
//! not look for stop markers itself; the engine decides when a reply is
//! over and the token ceiling is the backstop.
//!
//! A reply is all-or-nothing: on any failure the accumulated tokens are
//! dropped and only the error is returned.

use crate::ports::generation_engine::{EngineError, GenerationEngine, GenerationRequest};
use crate::ports::turn_progress::TurnProgressNotifier;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokchat_domain::{GenerationParams, GenerationResult, StopReason, TokenSequence};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors that can occur while generating a reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Engine failed to start: {0}")]
    Start(#[source] EngineError),

    #[error("Engine failed after {tokens} tokens: {source}")]
    Engine {
        tokens: usize,
        #[source]
        source: EngineError,
    },

    #[error("Generation cancelled after {tokens} tokens")]
    Cancelled { tokens: usize },

    #[error("Generation timed out after {limit:?} ({tokens} tokens)")]
    Timeout { tokens: usize, limit: Duration },
}

impl GenerationError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled { .. })
    }
}

/// Drives one generation pass per turn.
#[derive(Clone)]
pub struct GenerationDriver {
    engine: Arc<dyn GenerationEngine>,
    timeout: Option<Duration>,
}

impl GenerationDriver {
    pub fn new(engine: Arc<dyn GenerationEngine>) -> Self {
        Self {
            engine,
            timeout: None,
        }
    }

    /// Fail turns that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate a reply for `prompt`.
    ///
    /// `cancel` is checked before every pull from the engine; once it fires
    /// no further steps are requested.
    pub fn generate(
        &self,
        prompt: &TokenSequence,
        params: &GenerationParams,
        cancel: &CancellationToken,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<GenerationResult, GenerationError> {
        let request = GenerationRequest {
            prompt,
            num_samples: 1,
            max_tokens: params.max_new_tokens,
            temperature: params.temperature,
            top_k: params.top_k,
        };

        let mut stream = self
            .engine
            .generate(request)
            .map_err(GenerationError::Start)?;

        let started = Instant::now();
        let mut tokens = Vec::with_capacity(params.max_new_tokens.min(1024));

        let stop_reason = loop {
            if cancel.is_cancelled() {
                debug!("Generation cancelled after {} tokens", tokens.len());
                return Err(GenerationError::Cancelled {
                    tokens: tokens.len(),
                });
            }
            if tokens.len() >= params.max_new_tokens {
                break StopReason::MaxTokens;
            }
            if let Some(limit) = self.timeout
                && started.elapsed() > limit
            {
                warn!("Generation exceeded {:?}, discarding {} tokens", limit, tokens.len());
                return Err(GenerationError::Timeout {
                    tokens: tokens.len(),
                    limit,
                });
            }

            match stream.next() {
                None => break StopReason::EngineFinished,
                Some(Err(source)) => {
                    warn!(
                        "Engine failed after {} tokens, discarding partial reply: {}",
                        tokens.len(),
                        source
                    );
                    return Err(GenerationError::Engine {
                        tokens: tokens.len(),
                        source,
                    });
                }
                // Batch size is 1, so the validity mask carries no extra
                // information; only sample 0 is read.
                Some(Ok(step)) => match step.token(0) {
                    Some(token) => {
                        tokens.push(token);
                        progress.on_token(token, tokens.len());
                    }
                    None => {
                        return Err(GenerationError::Engine {
                            tokens: tokens.len(),
                            source: EngineError::Other("step carried no tokens".to_string()),
                        });
                    }
                },
            }
        };

        debug!(
            "Generated {} tokens in {:?} ({:?})",
            tokens.len(),
            started.elapsed(),
            stop_reason
        );

        Ok(GenerationResult::new(tokens, stop_reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation_engine::{GenerationStep, TokenStream};
    use crate::ports::turn_progress::NoTurnProgress;
    use crate::use_cases::test_support::{ScriptedEngine, Tail};
    use std::sync::Mutex;

    fn prompt() -> TokenSequence {
        TokenSequence::from(vec![256, 257, 104, 105, 258, 259])
    }

    fn run(
        engine: Arc<ScriptedEngine>,
        params: GenerationParams,
    ) -> Result<GenerationResult, GenerationError> {
        GenerationDriver::new(engine).generate(
            &prompt(),
            &params,
            &CancellationToken::new(),
            &NoTurnProgress,
        )
    }

    #[test]
    fn collects_until_engine_finishes() {
        let engine = Arc::new(ScriptedEngine::new(vec![72, 105, 260], Tail::End));
        let result = run(engine.clone(), GenerationParams::default()).unwrap();

        assert_eq!(result.tokens(), &[72, 105, 260]);
        assert_eq!(result.stop_reason(), StopReason::EngineFinished);
        assert_eq!(engine.calls(), 1);
    }

    #[test]
    fn passes_parameters_through_with_single_sample() {
        let engine = Arc::new(ScriptedEngine::new(vec![1], Tail::End));
        let params = GenerationParams::default()
            .with_temperature(1.25)
            .with_top_k(7)
            .with_max_new_tokens(33);
        run(engine.clone(), params).unwrap();

        let recorded = (*engine.last_request.lock().unwrap()).unwrap();
        assert_eq!(recorded, (6, 1, 33, 1.25, 7));
    }

    #[test]
    fn never_exceeds_max_new_tokens() {
        for max in [1usize, 2, 5, 17] {
            let engine = Arc::new(ScriptedEngine::new(Vec::new(), Tail::Repeat(65)));
            let params = GenerationParams::default().with_max_new_tokens(max);
            let result = run(engine.clone(), params).unwrap();

            assert_eq!(result.len(), max);
            assert_eq!(result.stop_reason(), StopReason::MaxTokens);
            assert_eq!(engine.pulled(), max, "driver must not pull past the ceiling");
        }
    }

    #[test]
    fn short_stream_stops_before_ceiling() {
        let engine = Arc::new(ScriptedEngine::new(vec![1, 2], Tail::End));
        let params = GenerationParams::default().with_max_new_tokens(10);
        let result = run(engine, params).unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.is_truncated());
    }

    #[test]
    fn fault_mid_stream_discards_tokens() {
        let engine = Arc::new(ScriptedEngine::new(vec![1, 2, 3, 4, 5], Tail::Fault));
        let err = run(engine, GenerationParams::default()).unwrap_err();

        match err {
            GenerationError::Engine { tokens, source } => {
                assert_eq!(tokens, 5);
                assert!(matches!(source, EngineError::Fault { step: 5, .. }));
            }
            other => panic!("Expected Engine error, got {other:?}"),
        }
    }

    #[test]
    fn start_failure_is_reported() {
        let engine = Arc::new(ScriptedEngine::failing_to_start(EngineError::InvalidPrompt(
            "empty".to_string(),
        )));
        let err = run(engine, GenerationParams::default()).unwrap_err();
        assert!(matches!(err, GenerationError::Start(EngineError::InvalidPrompt(_))));
    }

    #[test]
    fn cancelled_before_start_pulls_nothing() {
        let engine = Arc::new(ScriptedEngine::new(vec![1, 2, 3], Tail::End));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = GenerationDriver::new(engine.clone())
            .generate(&prompt(), &GenerationParams::default(), &cancel, &NoTurnProgress)
            .unwrap_err();

        assert_eq!(err, GenerationError::Cancelled { tokens: 0 });
        assert!(err.is_cancelled());
        assert_eq!(engine.pulled(), 0);
    }

    /// Cancels the token after a fixed number of tokens were reported.
    struct CancelAfter {
        after: usize,
        token: CancellationToken,
    }

    impl TurnProgressNotifier for CancelAfter {
        fn on_token(&self, _token: u32, count: usize) {
            if count == self.after {
                self.token.cancel();
            }
        }
    }

    #[test]
    fn cancellation_mid_stream_stops_pulling() {
        let engine = Arc::new(ScriptedEngine::new(Vec::new(), Tail::Repeat(65)));
        let cancel = CancellationToken::new();
        let progress = CancelAfter {
            after: 3,
            token: cancel.clone(),
        };

        let err = GenerationDriver::new(engine.clone())
            .generate(&prompt(), &GenerationParams::default(), &cancel, &progress)
            .unwrap_err();

        assert_eq!(err, GenerationError::Cancelled { tokens: 3 });
        assert_eq!(engine.pulled(), 3);
    }

    /// Engine whose steps take a fixed amount of time.
    struct SlowEngine {
        delay: Duration,
    }

    impl GenerationEngine for SlowEngine {
        fn generate<'a>(
            &'a self,
            _request: GenerationRequest<'a>,
        ) -> Result<TokenStream<'a>, EngineError> {
            let delay = self.delay;
            Ok(Box::new(std::iter::repeat_with(move || {
                std::thread::sleep(delay);
                Ok(GenerationStep::single(65))
            })))
        }
    }

    #[test]
    fn timeout_is_a_generation_error() {
        let driver = GenerationDriver::new(Arc::new(SlowEngine {
            delay: Duration::from_millis(5),
        }))
        .with_timeout(Some(Duration::from_millis(20)));

        let err = driver
            .generate(
                &prompt(),
                &GenerationParams::default().with_max_new_tokens(10_000),
                &CancellationToken::new(),
                &NoTurnProgress,
            )
            .unwrap_err();

        assert!(matches!(err, GenerationError::Timeout { .. }));
    }

    struct Recorder(Mutex<Vec<(u32, usize)>>);

    impl TurnProgressNotifier for Recorder {
        fn on_token(&self, token: u32, count: usize) {
            self.0.lock().unwrap().push((token, count));
        }
    }

    #[test]
    fn progress_sees_every_token() {
        let engine = Arc::new(ScriptedEngine::new(vec![7, 8, 9], Tail::End));
        let recorder = Recorder(Mutex::new(Vec::new()));
        GenerationDriver::new(engine)
            .generate(
                &prompt(),
                &GenerationParams::default(),
                &CancellationToken::new(),
                &recorder,
            )
            .unwrap();

        assert_eq!(*recorder.0.lock().unwrap(), vec![(7, 1), (8, 2), (9, 3)]);
    }
}
