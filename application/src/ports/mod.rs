//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod generation_engine;
pub mod tokenizer;
pub mod turn_progress;
