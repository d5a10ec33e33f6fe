//! Application layer for tokchat
//!
//! This crate contains the per-turn pipeline (encode, generate, sanitize),
//! the ports it consumes, and the per-session context object.
//! It depends only on the domain layer.

pub mod ports;
pub mod registry;
pub mod session;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    generation_engine::{
        EngineError, GenerationEngine, GenerationRequest, GenerationStep, TokenStream,
    },
    tokenizer::{Tokenizer, TokenizerError},
    turn_progress::{NoTurnProgress, TurnProgressNotifier},
};
pub use registry::{RegistryError, SpecialTokenRegistry};
pub use session::ChatSession;
pub use use_cases::encode_conversation::{ConversationEncoder, EncodingError};
pub use use_cases::generate_reply::{GenerationDriver, GenerationError};
pub use use_cases::respond::{RespondError, RespondUseCase};
