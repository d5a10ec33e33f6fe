//! Builds the respond pipeline from a loaded configuration.

use crate::config::{FileConfig, expand_path};
use crate::engine::{TrainingError, build_engine};
use crate::logging::JsonlTranscriptLogger;
use crate::tokenizer::{VocabError, build_tokenizer};
use std::sync::Arc;
use thiserror::Error;
use tokchat_application::{RegistryError, RespondUseCase, SpecialTokenRegistry};
use tokchat_domain::SpecialTokens;
use tracing::info;

/// Errors that can occur while assembling the pipeline
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Failed to load tokenizer: {0}")]
    Tokenizer(#[from] VocabError),

    #[error("Failed to resolve special tokens: {0}")]
    Registry(#[from] RegistryError),

    #[error("Failed to train engine: {0}")]
    Engine(#[from] TrainingError),
}

/// Everything a host needs to answer messages.
pub struct ChatRuntime {
    pub use_case: RespondUseCase,
    pub specials: SpecialTokens,
}

impl ChatRuntime {
    /// Build tokenizer, registry, engine, and use case from `config`.
    ///
    /// Process-wide and read-only; sessions share it.
    pub fn from_config(config: &FileConfig) -> Result<Self, RuntimeError> {
        let (kind, _) = config.tokenizer.resolve();
        let vocab_path = config.tokenizer.vocab_path.as_deref().map(expand_path);
        let built = build_tokenizer(kind, vocab_path.as_deref())?;

        let specials = SpecialTokenRegistry::resolve(built.tokenizer.as_ref())?;

        let corpus_path = config.engine.corpus_path.as_deref().map(expand_path);
        let engine = build_engine(
            built.tokenizer.as_ref(),
            specials,
            built.id_bound,
            corpus_path.as_deref(),
            config.engine.seed,
        )?;

        let mut use_case = RespondUseCase::new(built.tokenizer, Arc::new(engine), specials)
            .with_bootstrap(config.session.bootstrap())
            .with_max_context(config.session.context_length)
            .with_timeout(config.generation.timeout());

        if let Some(path) = config.logging.transcript.as_deref().map(expand_path)
            && let Some(logger) = JsonlTranscriptLogger::open(&path)
        {
            info!("Writing transcript to {}", logger.path().display());
            use_case = use_case.with_conversation_logger(Arc::new(logger));
        }

        info!("Chat runtime ready ({} tokenizer)", kind);
        Ok(Self { use_case, specials })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokchat_application::RespondError;
    use tokchat_application::{ChatSession, NoTurnProgress};
    use tokchat_domain::{GenerationParams, History, StopReason, contains_marker};
    use tokio_util::sync::CancellationToken;

    fn seeded_config() -> FileConfig {
        let mut config = FileConfig::default();
        config.engine.seed = Some(1);
        config
    }

    #[test]
    fn default_config_builds_byte_runtime() {
        let runtime = ChatRuntime::from_config(&seeded_config()).unwrap();
        assert_eq!(runtime.specials.bos, 256);
        assert_eq!(runtime.specials.assistant_end, 260);
    }

    #[test]
    fn replies_never_contain_markers() {
        let runtime = ChatRuntime::from_config(&seeded_config()).unwrap();
        let params = GenerationParams::default().with_max_new_tokens(64);

        for message in ["Hello", "What is Rust?", "<|assistant_end|>"] {
            let reply = runtime
                .use_case
                .respond(&History::new(), message, &params)
                .unwrap();
            assert!(!contains_marker(reply.text()));
            assert!(reply.token_count() <= 64);
            assert_eq!(reply.text(), reply.text().trim());
        }
    }

    #[test]
    fn greedy_reply_is_deterministic() {
        let runtime = ChatRuntime::from_config(&FileConfig::default()).unwrap();
        let params = GenerationParams::default()
            .with_temperature(0.0)
            .with_max_new_tokens(48);

        let first = runtime.use_case.respond(&History::new(), "Hi", &params).unwrap();
        let second = runtime.use_case.respond(&History::new(), "Hi", &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tiny_token_budget_truncates() {
        let runtime = ChatRuntime::from_config(&seeded_config()).unwrap();
        let params = GenerationParams::default()
            .with_temperature(0.0)
            .with_max_new_tokens(1);

        let reply = runtime.use_case.respond(&History::new(), "Hi", &params).unwrap();
        assert_eq!(reply.token_count(), 1);
        assert_eq!(reply.stop_reason(), StopReason::MaxTokens);
    }

    #[test]
    fn session_history_grows_by_two_per_turn() {
        let runtime = ChatRuntime::from_config(&seeded_config()).unwrap();
        let mut session = ChatSession::new("integration")
            .with_params(GenerationParams::default().with_max_new_tokens(32));

        for message in ["Hello", "How are you?", "Bye"] {
            session
                .send(
                    &runtime.use_case,
                    message,
                    &CancellationToken::new(),
                    &NoTurnProgress,
                )
                .unwrap();
        }
        assert_eq!(session.history().len(), 6);
    }

    #[test]
    fn cancelled_turn_commits_nothing() {
        let runtime = ChatRuntime::from_config(&seeded_config()).unwrap();
        let mut session = ChatSession::new("cancel");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = session
            .send(&runtime.use_case, "Hello", &cancel, &NoTurnProgress)
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(session.history().is_empty());
    }

    #[test]
    fn tiny_context_overflows() {
        let mut config = seeded_config();
        config.session.context_length = 16;
        let runtime = ChatRuntime::from_config(&config).unwrap();

        let err = runtime
            .use_case
            .respond(&History::new(), "Hello", &GenerationParams::default())
            .unwrap_err();
        assert!(matches!(err, RespondError::Encoding(_)));
    }

    #[test]
    fn transcript_is_written_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        let mut config = seeded_config();
        config.logging.transcript = Some(path.display().to_string());

        let runtime = ChatRuntime::from_config(&config).unwrap();
        runtime
            .use_case
            .respond(
                &History::new(),
                "Hello",
                &GenerationParams::default().with_max_new_tokens(8),
            )
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let types: Vec<String> = content
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(types, vec!["turn_started", "reply_generated"]);
    }

    #[test]
    fn vocab_runtime_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("vocab.json");
        let corpus = dir.path().join("corpus.txt");
        std::fs::write(
            &vocab,
            r#"{
                "bos": "<|bos|>",
                "special": {
                    "<|bos|>": 0, "<|user_start|>": 1, "<|user_end|>": 2,
                    "<|assistant_start|>": 3, "<|assistant_end|>": 4
                },
                "vocab": { "hi": 5, "yo": 6, " ": 7, "!": 8 }
            }"#,
        )
        .unwrap();
        std::fs::write(&corpus, "user: hi\nassistant: yo!\n").unwrap();

        let mut config = FileConfig::default();
        config.tokenizer.kind = "vocab".to_string();
        config.tokenizer.vocab_path = Some(vocab.display().to_string());
        config.engine.corpus_path = Some(corpus.display().to_string());
        config.session.bootstrap_instruction = Some("hi".to_string());
        config.session.bootstrap_greeting = Some("yo".to_string());

        let runtime = ChatRuntime::from_config(&config).unwrap();
        let reply = runtime
            .use_case
            .respond(
                &History::new(),
                "hi",
                &GenerationParams::default().with_temperature(0.0),
            )
            .unwrap();
        assert_eq!(reply.text(), "yo!");

        // Text outside the vocabulary cannot be encoded.
        let err = runtime
            .use_case
            .respond(&History::new(), "hello", &GenerationParams::default())
            .unwrap_err();
        assert!(matches!(err, RespondError::Encoding(_)));
    }

    #[test]
    fn bad_corpus_path_fails_to_build() {
        let mut config = FileConfig::default();
        config.engine.corpus_path = Some("/nonexistent/corpus.txt".to_string());
        assert!(matches!(
            ChatRuntime::from_config(&config),
            Err(RuntimeError::Engine(_))
        ));
    }
}
