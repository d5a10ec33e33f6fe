//! Generation engine adapters.

mod bigram;
mod corpus;

pub use bigram::{BigramEngine, TrainingError};
pub use corpus::{BUILTIN_CORPUS, CorpusError, load_corpus, parse_corpus};

use std::path::Path;
use tokchat_application::ports::tokenizer::Tokenizer;
use tokchat_domain::SpecialTokens;

/// Train the bigram engine on `corpus_path`, or on the built-in corpus.
pub fn build_engine(
    tokenizer: &dyn Tokenizer,
    specials: SpecialTokens,
    id_bound: usize,
    corpus_path: Option<&Path>,
    seed: Option<u64>,
) -> Result<BigramEngine, TrainingError> {
    let engine = match corpus_path {
        Some(path) => BigramEngine::from_corpus_file(tokenizer, specials, id_bound, path)?,
        None => BigramEngine::from_corpus_text(tokenizer, specials, id_bound, BUILTIN_CORPUS)?,
    };
    Ok(engine.with_seed(seed))
}
