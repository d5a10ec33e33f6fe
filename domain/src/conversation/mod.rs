//! Conversation domain.
//!
//! - [`entities::Message`]: a single role-tagged message
//! - [`entities::History`]: the append-only record of a session's turns
//! - [`bootstrap::BootstrapExchange`]: the synthetic first exchange used to
//!   prime an empty conversation

pub mod bootstrap;
pub mod entities;
