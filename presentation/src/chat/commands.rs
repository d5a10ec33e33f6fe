//! Slash commands understood by the chat REPL

use tokchat_domain::GenerationParams;

/// A parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    History,
    /// Show the current generation parameters
    Params,
    /// `/params <name> <value>`
    SetParam { name: String, value: String },
    Reset,
    Quit,
}

impl ReplCommand {
    /// Parse a line starting with `/`.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match (command, args.as_slice()) {
            ("/help" | "/h" | "/?", []) => Ok(ReplCommand::Help),
            ("/history", []) => Ok(ReplCommand::History),
            ("/params", []) => Ok(ReplCommand::Params),
            ("/params", [name, value]) => Ok(ReplCommand::SetParam {
                name: name.to_string(),
                value: value.to_string(),
            }),
            ("/params", _) => Err("Usage: /params [<name> <value>]".to_string()),
            ("/reset" | "/clear", []) => Ok(ReplCommand::Reset),
            ("/quit" | "/exit" | "/q", []) => Ok(ReplCommand::Quit),
            _ => Err(format!("Unknown command: {}", line)),
        }
    }
}

/// Return `params` with one field changed, rejecting values the driver
/// would refuse.
pub fn apply_param(
    params: GenerationParams,
    name: &str,
    value: &str,
) -> Result<GenerationParams, String> {
    let bad_value = || format!("Invalid value for {}: {}", name, value);

    let updated = match name {
        "temperature" | "temp" | "t" => {
            params.with_temperature(value.parse::<f32>().map_err(|_| bad_value())?)
        }
        "top_k" | "top-k" | "k" => {
            params.with_top_k(value.parse::<usize>().map_err(|_| bad_value())?)
        }
        "max_tokens" | "max-tokens" | "max_new_tokens" | "n" => params
            .with_max_new_tokens(value.parse::<usize>().map_err(|_| bad_value())?),
        other => {
            return Err(format!(
                "Unknown parameter: {} (expected temperature, top_k or max_tokens)",
                other
            ));
        }
    };

    updated.validate().map_err(|e| e.to_string())?;
    Ok(updated)
}

pub const HELP: &str = "\
Commands:
  /help, /h, /?               - Show this help
  /history                    - Show the conversation so far
  /params                     - Show generation parameters
  /params <name> <value>      - Change temperature, top_k or max_tokens
  /reset, /clear              - Start a new conversation
  /quit, /exit, /q            - Exit chat

Press Ctrl-C to stop a reply, Ctrl-D to exit.";
