//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod encode_conversation;
pub mod generate_reply;
pub mod respond;

#[cfg(test)]
pub(crate) mod test_support;
