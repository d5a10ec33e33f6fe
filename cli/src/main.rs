//! CLI entrypoint for tokchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use std::sync::Arc;
use tokchat_application::{ChatSession, NoTurnProgress, TurnProgressNotifier};
use tokchat_domain::config::validation::has_errors;
use tokchat_domain::{GenerationParams, OutputFormat};
use tokchat_infrastructure::{ChatRuntime, ConfigLoader, FileConfig, expand_path};
use tokchat_presentation::{
    ChatRepl, Cli, ConsoleFormatter, ReplConfig, TokenProgress, run_cancellable,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    info!("Starting tokchat");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    apply_cli_overrides(&cli, &mut config);

    let issues = config.validate();
    for issue in &issues {
        eprintln!("{}", ConsoleFormatter::format_config_issue(issue));
    }
    if has_errors(&issues) {
        bail!("Invalid configuration");
    }

    ConsoleFormatter::set_color(config.output.color);
    let (params, _) = config.generation.to_params();

    // === Dependency Injection ===
    let runtime = ChatRuntime::from_config(&config)?;
    let use_case = Arc::new(runtime.use_case);
    let session = ChatSession::new(format!("tokchat-{}", std::process::id())).with_params(params);

    // Chat mode
    if cli.is_chat() {
        let repl_config = ReplConfig {
            show_progress: config.repl.show_progress && !cli.quiet,
            history_file: config.repl.history_file.as_deref().map(expand_path),
        };
        let mut repl = ChatRepl::new(use_case, session).with_config(repl_config);
        repl.run().await?;
        return Ok(());
    }

    // Single message mode
    let Some(message) = cli.message.clone() else {
        bail!("Message is required. Use --chat for interactive mode.");
    };
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    let progress: Arc<dyn TurnProgressNotifier> = if cli.quiet || !config.repl.show_progress {
        Arc::new(NoTurnProgress)
    } else {
        Arc::new(TokenProgress::new())
    };

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let history = session.history().clone();
    let reply = run_cancellable(CancellationToken::new(), interrupt, move |cancel| {
        use_case.respond_with(&history, &message, &params, &cancel, progress.as_ref())
    })
    .await??;

    println!("{}", ConsoleFormatter::format_reply(&reply, format));

    Ok(())
}

/// Command-line flags win over every config source.
fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    let params = cli.apply_generation_overrides(GenerationParams {
        temperature: config.generation.temperature,
        top_k: config.generation.top_k,
        max_new_tokens: config.generation.max_new_tokens,
    });
    config.generation.temperature = params.temperature;
    config.generation.top_k = params.top_k;
    config.generation.max_new_tokens = params.max_new_tokens;

    if let Some(seed) = cli.seed {
        config.engine.seed = Some(seed);
    }
}
