//! REPL (Read-Eval-Print Loop) for interactive chat

use super::commands::{HELP, ReplCommand, apply_param};
use super::turn::run_cancellable;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::TokenProgress;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tokchat_application::{
    ChatSession, NoTurnProgress, RespondUseCase, TurnProgressNotifier,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<RespondUseCase>,
    session: ChatSession,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl around one session
    pub fn new(use_case: Arc<RespondUseCase>, session: ChatSession) -> Self {
        Self {
            use_case,
            session,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C at the prompt only clears the line
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path
            && let Err(e) = rl.save_history(path)
        {
            warn!("Could not save REPL history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", ConsoleFormatter::header("TokChat - Chat Mode"));
        println!();
        println!("{}", HELP);
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, line: &str) -> bool {
        let command = match ReplCommand::parse(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                println!("Type /help for available commands");
                return false;
            }
        };

        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                println!("{}", HELP);
                println!();
            }
            ReplCommand::History => {
                println!();
                println!("{}", ConsoleFormatter::format_history(self.session.history()));
                println!();
            }
            ReplCommand::Params => {
                println!("{}", ConsoleFormatter::format_params(self.session.params()));
            }
            ReplCommand::SetParam { name, value } => {
                match apply_param(*self.session.params(), &name, &value) {
                    Ok(params) => {
                        self.session.set_params(params);
                        println!("{}", ConsoleFormatter::format_params(&params));
                    }
                    Err(message) => println!("{}", message),
                }
            }
            ReplCommand::Reset => {
                self.session.reset();
                println!("Conversation cleared.");
            }
        }
        false
    }

    async fn process_message(&mut self, message: &str) {
        let use_case = Arc::clone(&self.use_case);
        let history = self.session.history().clone();
        let params = *self.session.params();
        let owned = message.to_string();
        let progress: Arc<dyn TurnProgressNotifier> = if self.config.show_progress {
            Arc::new(TokenProgress::new())
        } else {
            Arc::new(NoTurnProgress)
        };

        let interrupt = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        let joined = run_cancellable(CancellationToken::new(), interrupt, move |cancel| {
            use_case.respond_with(&history, &owned, &params, &cancel, progress.as_ref())
        })
        .await;

        match joined {
            Ok(Ok(reply)) => {
                self.session.record_turn(message, &reply);
                println!("{}", ConsoleFormatter::format_chat_reply(&reply));
            }
            Ok(Err(e)) => {
                eprintln!("{}", ConsoleFormatter::format_error(&e));
            }
            Err(e) => {
                eprintln!("Error: turn aborted: {}", e);
            }
        }
        println!();
    }
}
