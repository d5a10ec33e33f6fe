//! Reply domain.
//!
//! - [`sanitizer::sanitize`]: strip leaked marker text from decoded output
//! - [`entities::Reply`]: the cleaned text shown to the user

pub mod entities;
pub mod sanitizer;
