//! Bigram sampling engine.
//!
//! A tiny stand-in for a neural model: it counts which token follows which
//! in a corpus of framed conversations and samples from those counts.
//! Replies end with `assistant_end` because every training reply does.

use super::corpus::{CorpusError, load_corpus, parse_corpus};
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokchat_application::ports::generation_engine::{
    EngineError, GenerationEngine, GenerationRequest, GenerationStep, TokenStream,
};
use tokchat_application::ports::tokenizer::{Tokenizer, TokenizerError};
use tokchat_domain::{History, Role, SpecialMarker, SpecialTokens, TokenId, TokenSequenceBuilder};
use tracing::{debug, info};

/// Errors that can occur while training the engine
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("Failed to tokenize corpus: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("Corpus token id {id} is outside the vocabulary (bound {bound})")]
    IdOutOfRange { id: TokenId, bound: usize },

    #[error("Corpus produced no token pairs")]
    Empty,
}

/// Successor candidates, most frequent first.
type Candidates = Vec<(TokenId, u32)>;

/// Token-bigram language model.
pub struct BigramEngine {
    specials: SpecialTokens,
    id_bound: usize,
    successors: HashMap<TokenId, Candidates>,
    /// Used when the previous token never appeared in training.
    fallback: Candidates,
    seed: Option<u64>,
    passes: AtomicU64,
}

impl BigramEngine {
    /// Train on already parsed conversations.
    ///
    /// Every conversation is framed the same way prompts are: `bos`, then
    /// each message wrapped in its role's start/end markers.
    pub fn train(
        tokenizer: &dyn Tokenizer,
        specials: SpecialTokens,
        id_bound: usize,
        corpus: &[History],
    ) -> Result<Self, TrainingError> {
        let mut pairs: HashMap<TokenId, HashMap<TokenId, u32>> = HashMap::new();
        let mut unigrams: HashMap<TokenId, u32> = HashMap::new();

        for history in corpus {
            let sequence = frame(tokenizer, specials, history)?;
            if let Some(&id) = sequence.iter().find(|&&id| id as usize >= id_bound) {
                return Err(TrainingError::IdOutOfRange {
                    id,
                    bound: id_bound,
                });
            }
            for window in sequence.windows(2) {
                *pairs
                    .entry(window[0])
                    .or_default()
                    .entry(window[1])
                    .or_default() += 1;
                *unigrams.entry(window[1]).or_default() += 1;
            }
        }

        if unigrams.is_empty() {
            return Err(TrainingError::Empty);
        }

        let successors: HashMap<TokenId, Candidates> = pairs
            .into_iter()
            .map(|(prev, next)| (prev, ranked(next)))
            .collect();

        info!(
            "Trained bigram engine on {} conversations ({} contexts)",
            corpus.len(),
            successors.len()
        );

        Ok(Self {
            specials,
            id_bound,
            successors,
            fallback: ranked(unigrams),
            seed: None,
            passes: AtomicU64::new(0),
        })
    }

    /// Train on corpus text in the `user:` / `assistant:` line format.
    pub fn from_corpus_text(
        tokenizer: &dyn Tokenizer,
        specials: SpecialTokens,
        id_bound: usize,
        text: &str,
    ) -> Result<Self, TrainingError> {
        let corpus = parse_corpus(text)?;
        Self::train(tokenizer, specials, id_bound, &corpus)
    }

    /// Train on a corpus file.
    pub fn from_corpus_file(
        tokenizer: &dyn Tokenizer,
        specials: SpecialTokens,
        id_bound: usize,
        path: impl AsRef<Path>,
    ) -> Result<Self, TrainingError> {
        let corpus = load_corpus(path)?;
        Self::train(tokenizer, specials, id_bound, &corpus)
    }

    /// Make sampling reproducible.
    ///
    /// Pass `n` of the engine uses `seed + n`, so repeated turns differ but
    /// a rerun of the same session repeats exactly.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                let pass = self.passes.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed.wrapping_add(pass))
            }
            None => StdRng::from_entropy(),
        }
    }

    fn validate(&self, request: &GenerationRequest<'_>) -> Result<(), EngineError> {
        if request.prompt.is_empty() {
            return Err(EngineError::InvalidPrompt("prompt is empty".to_string()));
        }
        if let Some(id) = request.prompt.iter().find(|&id| id as usize >= self.id_bound) {
            return Err(EngineError::InvalidPrompt(format!(
                "token id {id} is outside the vocabulary (bound {})",
                self.id_bound
            )));
        }
        if request.num_samples == 0 {
            return Err(EngineError::InvalidRequest(
                "num_samples must be at least 1".to_string(),
            ));
        }
        if request.top_k == 0 {
            return Err(EngineError::InvalidRequest(
                "top_k must be at least 1".to_string(),
            ));
        }
        if request.temperature.is_nan() || request.temperature < 0.0 {
            return Err(EngineError::InvalidRequest(format!(
                "temperature must be >= 0, got {}",
                request.temperature
            )));
        }
        Ok(())
    }

    /// Pick the token following `prev`.
    fn sample_next(
        &self,
        prev: TokenId,
        temperature: f32,
        top_k: usize,
        rng: &mut StdRng,
    ) -> Result<TokenId, String> {
        let candidates = self.successors.get(&prev).unwrap_or(&self.fallback);
        let candidates = &candidates[..top_k.min(candidates.len())];
        let Some(&(best, best_count)) = candidates.first() else {
            return Err(format!("no candidates after token {prev}"));
        };
        if temperature == 0.0 || candidates.len() == 1 {
            return Ok(best);
        }

        // count^(1/T), scaled by the best count to stay finite
        let t = f64::from(temperature);
        let max_ln = f64::from(best_count).ln();
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&(_, count)| ((f64::from(count).ln() - max_ln) / t).exp())
            .collect();
        let dist = WeightedIndex::new(&weights).map_err(|e| e.to_string())?;
        Ok(candidates[dist.sample(rng)].0)
    }
}

impl GenerationEngine for BigramEngine {
    fn generate<'a>(
        &'a self,
        request: GenerationRequest<'a>,
    ) -> Result<TokenStream<'a>, EngineError> {
        self.validate(&request)?;

        let last = request.prompt.last().unwrap_or(self.specials.bos);
        debug!(
            "Starting bigram pass: prompt={} samples={} max_tokens={} temperature={} top_k={}",
            request.prompt.len(),
            request.num_samples,
            request.max_tokens,
            request.temperature,
            request.top_k
        );

        Ok(Box::new(BigramStream {
            engine: self,
            last: vec![last; request.num_samples],
            finished: vec![false; request.num_samples],
            produced: 0,
            failed: false,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_k: request.top_k,
            rng: self.rng(),
        }))
    }
}

struct BigramStream<'a> {
    engine: &'a BigramEngine,
    last: Vec<TokenId>,
    finished: Vec<bool>,
    produced: usize,
    failed: bool,
    max_tokens: usize,
    temperature: f32,
    top_k: usize,
    rng: StdRng,
}

impl Iterator for BigramStream<'_> {
    type Item = Result<GenerationStep, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed
            || self.produced >= self.max_tokens
            || self.finished.iter().all(|&done| done)
        {
            return None;
        }

        let filler = self.engine.specials.assistant_end;
        let mut tokens = Vec::with_capacity(self.last.len());
        let mut mask = Vec::with_capacity(self.last.len());

        for sample in 0..self.last.len() {
            if self.finished[sample] {
                tokens.push(filler);
                mask.push(false);
                continue;
            }

            let next = match self.engine.sample_next(
                self.last[sample],
                self.temperature,
                self.top_k,
                &mut self.rng,
            ) {
                Ok(next) => next,
                Err(message) => {
                    self.failed = true;
                    return Some(Err(EngineError::Fault {
                        step: self.produced,
                        message,
                    }));
                }
            };

            self.last[sample] = next;
            if self.engine.specials.ends_turn(next) {
                self.finished[sample] = true;
            }
            tokens.push(next);
            mask.push(true);
        }

        self.produced += 1;
        Some(Ok(GenerationStep { tokens, mask }))
    }
}

fn frame(
    tokenizer: &dyn Tokenizer,
    specials: SpecialTokens,
    history: &History,
) -> Result<Vec<TokenId>, TokenizerError> {
    let mut builder = TokenSequenceBuilder::new(specials);
    builder.marker(SpecialMarker::Bos);
    for message in history {
        let (open, close) = match message.role {
            Role::User => (SpecialMarker::UserStart, SpecialMarker::UserEnd),
            Role::Assistant => (SpecialMarker::AssistantStart, SpecialMarker::AssistantEnd),
        };
        builder.wrapped(open, &tokenizer.encode(&message.content)?, close);
    }
    Ok(builder.build().into_vec())
}

fn ranked(counts: HashMap<TokenId, u32>) -> Candidates {
    let mut ranked: Candidates = counts.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}
