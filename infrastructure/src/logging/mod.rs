//! Transcript logging.
//!
//! Provides [`JsonlTranscriptLogger`], a JSONL file writer implementing the
//! [`ConversationLogger`](tokchat_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlTranscriptLogger;
