//! Generation value objects.
//!
//! - [`params::GenerationParams`]: per-turn sampling knobs passed to the engine
//! - [`result::GenerationResult`]: the tokens produced for one reply

pub mod params;
pub mod result;
