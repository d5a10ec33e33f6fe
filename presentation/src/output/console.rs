//! Console output formatter for replies and session state

use colored::Colorize;
use tokchat_application::RespondError;
use tokchat_domain::{
    ConfigIssue, GenerationParams, History, OutputFormat, Reply, Role, Severity, StopReason,
};

/// Formats chat output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn colors off, or back to terminal auto-detection
    pub fn set_color(enabled: bool) {
        if enabled {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
    }

    /// Format a reply in the requested format
    pub fn format_reply(reply: &Reply, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => reply.text().to_string(),
            OutputFormat::Full => Self::format_full(reply),
            OutputFormat::Json => Self::format_json(reply),
        }
    }

    /// Reply text followed by a one-line summary
    pub fn format_full(reply: &Reply) -> String {
        let mut output = String::new();
        output.push_str(reply.text());
        output.push_str("\n\n");
        output.push_str(
            &format!(
                "({} tokens, stopped: {})",
                reply.token_count(),
                Self::stop_reason_label(reply.stop_reason())
            )
            .dimmed()
            .to_string(),
        );
        output
    }

    /// Format as JSON
    pub fn format_json(reply: &Reply) -> String {
        serde_json::to_string_pretty(reply).unwrap_or_else(|_| "{}".to_string())
    }

    /// Reply as shown inside the REPL
    pub fn format_chat_reply(reply: &Reply) -> String {
        let mut output = format!("{} {}", "Assistant:".green().bold(), reply.text());
        if reply.is_truncated() {
            output.push_str(&format!(" {}", "[truncated]".yellow()));
        }
        output
    }

    pub fn format_history(history: &History) -> String {
        if history.is_empty() {
            return "(no messages yet)".dimmed().to_string();
        }

        history
            .iter()
            .map(|message| {
                let label = match message.role {
                    Role::User => "You:".cyan().bold(),
                    Role::Assistant => "Assistant:".green().bold(),
                };
                format!("{} {}", label, message.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_params(params: &GenerationParams) -> String {
        format!(
            "{}\n  temperature    {}\n  top_k          {}\n  max_tokens     {}",
            "Generation parameters:".cyan().bold(),
            params.temperature,
            params.top_k,
            params.max_new_tokens
        )
    }

    /// Format a failed turn
    pub fn format_error(error: &RespondError) -> String {
        if error.is_cancelled() {
            return "(cancelled)".yellow().to_string();
        }
        format!("{} {}", "Error:".red().bold(), error)
    }

    pub fn format_config_issue(issue: &ConfigIssue) -> String {
        match issue.severity {
            Severity::Error => format!("{} {}", "config error:".red().bold(), issue.message),
            Severity::Warning => format!("{} {}", "config warning:".yellow(), issue.message),
        }
    }

    fn stop_reason_label(reason: StopReason) -> &'static str {
        match reason {
            StopReason::EngineFinished => "end of reply",
            StopReason::MaxTokens => "token limit",
        }
    }

    pub fn header(title: &str) -> String {
        let line = "─".repeat(45);
        format!("╭{}╮\n│{:^45}│\n╰{}╯", line, title, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokchat_application::GenerationError;
    use tokchat_domain::config::validation::ConfigIssueCode;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_text_format_is_just_the_reply() {
        plain();
        let reply = Reply::new("Hello!", 3, StopReason::EngineFinished);
        assert_eq!(
            ConsoleFormatter::format_reply(&reply, OutputFormat::Text),
            "Hello!"
        );
    }

    #[test]
    fn test_full_format_reports_stop_reason() {
        plain();
        let reply = Reply::new("Hel", 3, StopReason::MaxTokens);
        let output = ConsoleFormatter::format_reply(&reply, OutputFormat::Full);
        assert!(output.starts_with("Hel\n\n"));
        assert!(output.contains("3 tokens"));
        assert!(output.contains("token limit"));
    }

    #[test]
    fn test_json_format_parses() {
        let reply = Reply::new("Hi", 2, StopReason::EngineFinished);
        let output = ConsoleFormatter::format_reply(&reply, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["text"], "Hi");
        assert_eq!(value["stop_reason"], "engine_finished");
    }

    #[test]
    fn test_chat_reply_marks_truncation() {
        plain();
        let reply = Reply::new("abc", 8, StopReason::MaxTokens);
        let output = ConsoleFormatter::format_chat_reply(&reply);
        assert_eq!(output, "Assistant: abc [truncated]");
    }

    #[test]
    fn test_history_lists_messages_in_order() {
        plain();
        let mut history = History::new();
        history.push_turn("Hi", "Hello!");
        let output = ConsoleFormatter::format_history(&history);
        assert_eq!(output, "You: Hi\nAssistant: Hello!");
        assert!(ConsoleFormatter::format_history(&History::new()).contains("no messages"));
    }

    #[test]
    fn test_params_listing() {
        plain();
        let output = ConsoleFormatter::format_params(&GenerationParams::default());
        assert!(output.contains("temperature    0.8"));
        assert!(output.contains("top_k          50"));
        assert!(output.contains("max_tokens     256"));
    }

    #[test]
    fn test_cancelled_error_is_quiet() {
        plain();
        let cancelled = RespondError::Generation(GenerationError::Cancelled { tokens: 4 });
        assert_eq!(ConsoleFormatter::format_error(&cancelled), "(cancelled)");
    }

    #[test]
    fn test_config_issue_labels() {
        plain();
        let issue = ConfigIssue::warning(
            ConfigIssueCode::OutOfRecommendedRange {
                field: "generation.top_k".to_string(),
            },
            "generation.top_k: 500 is outside the recommended range 1..=200",
        );
        assert!(ConsoleFormatter::format_config_issue(&issue).starts_with("config warning:"));
    }
}
