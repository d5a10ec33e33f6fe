//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface.

mod commands;
mod repl;
mod turn;

pub use commands::{ReplCommand, apply_param};
pub use repl::ChatRepl;
pub use turn::run_cancellable;
