//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tokchat_domain::{GenerationParams, OutputFormat};

/// Reply format for one-shot mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplyFormat {
    /// Only the reply text
    Text,
    /// Reply text plus token count and stop reason
    Full,
    /// JSON object
    Json,
}

impl From<ReplyFormat> for OutputFormat {
    fn from(format: ReplyFormat) -> Self {
        match format {
            ReplyFormat::Text => OutputFormat::Text,
            ReplyFormat::Full => OutputFormat::Full,
            ReplyFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for tokchat
#[derive(Parser, Debug)]
#[command(name = "tokchat")]
#[command(author, version, about = "Chat with a token-level language model")]
#[command(long_about = r#"
tokchat frames your conversation with special tokens, samples a reply from
the generation engine, and strips any marker text from the result.

Configuration files are loaded from (in priority order):
1. TOKCHAT_<SECTION>__<KEY>                environment variables
2. --config <path>                         explicit config file
3. ./tokchat.toml or ./.tokchat.toml       project-level config
4. ~/.config/tokchat/config.toml           global config

Example:
  tokchat "Hello!"
  tokchat --temperature 0 --max-tokens 64 "What is Rust?"
  tokchat --chat --seed 42
"#)]
pub struct Cli {
    /// Message to answer (starts chat mode when omitted)
    pub message: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Sampling temperature (0 = greedy)
    #[arg(short, long, value_name = "T")]
    pub temperature: Option<f32>,

    /// Keep only the K most likely tokens when sampling
    #[arg(short = 'k', long, value_name = "K")]
    pub top_k: Option<usize>,

    /// Maximum number of tokens in a reply
    #[arg(short = 'n', long, value_name = "N")]
    pub max_tokens: Option<usize>,

    /// Seed for reproducible sampling
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Reply format (one-shot mode)
    #[arg(short, long, value_enum)]
    pub output: Option<ReplyFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Apply generation flags on top of configured params.
    pub fn apply_generation_overrides(&self, mut params: GenerationParams) -> GenerationParams {
        if let Some(t) = self.temperature {
            params.temperature = t;
        }
        if let Some(k) = self.top_k {
            params.top_k = k;
        }
        if let Some(n) = self.max_tokens {
            params.max_new_tokens = n;
        }
        params
    }

    /// Chat mode was requested explicitly or no message was given.
    pub fn is_chat(&self) -> bool {
        self.chat || self.message.is_none()
    }
}
