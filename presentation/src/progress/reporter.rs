//! Progress reporting while a reply is generated

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tokchat_application::TurnProgressNotifier;
use tokchat_domain::{GenerationResult, TokenId};

/// Spinner with a live token counter.
///
/// The spinner is cleared when the turn ends so the reply prints on a clean
/// line.
pub struct TokenProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TokenProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn finish(&self) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for TokenProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnProgressNotifier for TokenProgress {
    fn on_prompt_encoded(&self, prompt_tokens: usize) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(format!("Thinking ({} prompt tokens)", prompt_tokens));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_token(&self, _token: TokenId, count: usize) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(format!("Generating... {} tokens", count));
        }
    }

    fn on_generation_complete(&self, _result: &GenerationResult) {
        self.finish();
    }

    fn on_generation_failed(&self, _error: &str) {
        self.finish();
    }
}
