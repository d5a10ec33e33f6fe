//! Test doubles shared by the use case tests.

use crate::ports::generation_engine::{
    EngineError, GenerationEngine, GenerationRequest, GenerationStep, TokenStream,
};
use crate::ports::tokenizer::{Tokenizer, TokenizerError};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokchat_domain::{SpecialMarker, SpecialTokens, TokenId};

pub fn specials() -> SpecialTokens {
    SpecialTokens {
        bos: 256,
        user_start: 257,
        user_end: 258,
        assistant_start: 259,
        assistant_end: 260,
    }
}

/// Byte-per-token tokenizer that refuses NUL characters.
pub struct ByteTokenizer {
    specials: SpecialTokens,
}

impl ByteTokenizer {
    pub fn new() -> Self {
        Self {
            specials: specials(),
        }
    }

    pub fn ids(text: &str) -> Vec<TokenId> {
        text.bytes().map(TokenId::from).collect()
    }
}

impl Tokenizer for ByteTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        if text.contains('\u{0}') {
            return Err(TokenizerError::UnencodableText("NUL byte".to_string()));
        }
        Ok(Self::ids(text))
    }

    fn decode(&self, ids: &[TokenId]) -> String {
        let mut out = String::new();
        let mut bytes = Vec::new();
        for &id in ids {
            if let Some(marker) = self.specials.marker(id) {
                out.push_str(&String::from_utf8_lossy(&bytes));
                bytes.clear();
                out.push_str(marker.literal());
            } else if let Ok(b) = u8::try_from(id) {
                bytes.push(b);
            }
        }
        out.push_str(&String::from_utf8_lossy(&bytes));
        out
    }

    fn resolve_special(&self, literal: &str) -> Result<TokenId, TokenizerError> {
        SpecialMarker::from_literal(literal)
            .map(|m| self.specials.id(m))
            .ok_or_else(|| TokenizerError::UnknownSpecial(literal.to_string()))
    }

    fn bos_token_id(&self) -> TokenId {
        self.specials.bos
    }
}

/// What the scripted engine does after its scripted tokens run out.
#[derive(Clone, Copy)]
pub enum Tail {
    /// The stream ends.
    End,
    /// The stream yields a fault.
    Fault,
    /// The stream keeps yielding the same token forever.
    Repeat(TokenId),
}

/// Engine that replays a fixed token script.
pub struct ScriptedEngine {
    script: Vec<TokenId>,
    tail: Tail,
    start_error: Option<EngineError>,
    pub calls: AtomicUsize,
    pub pulled: AtomicUsize,
    pub last_request: Mutex<Option<(usize, usize, usize, f32, usize)>>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<TokenId>, tail: Tail) -> Self {
        Self {
            script,
            tail,
            start_error: None,
            calls: AtomicUsize::new(0),
            pulled: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Engine that emits `text` as bytes followed by `<|assistant_end|>`.
    pub fn replying(text: &str) -> Self {
        let mut script = ByteTokenizer::ids(text);
        script.push(specials().assistant_end);
        Self::new(script, Tail::End)
    }

    pub fn failing_to_start(error: EngineError) -> Self {
        let mut engine = Self::new(Vec::new(), Tail::End);
        engine.start_error = Some(error);
        engine
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

impl GenerationEngine for ScriptedEngine {
    fn generate<'a>(
        &'a self,
        request: GenerationRequest<'a>,
    ) -> Result<TokenStream<'a>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((
            request.prompt.len(),
            request.num_samples,
            request.max_tokens,
            request.temperature,
            request.top_k,
        ));
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }

        let mut step = 0usize;
        let stream = std::iter::from_fn(move || {
            let item = match self.script.get(step) {
                Some(&token) => Some(Ok(GenerationStep::single(token))),
                None => match self.tail {
                    Tail::End => None,
                    Tail::Fault => Some(Err(EngineError::Fault {
                        step,
                        message: "device lost".to_string(),
                    })),
                    Tail::Repeat(token) => Some(Ok(GenerationStep::single(token))),
                },
            };
            if item.is_some() {
                self.pulled.fetch_add(1, Ordering::SeqCst);
                step += 1;
            }
            item
        });
        Ok(Box::new(stream))
    }
}
