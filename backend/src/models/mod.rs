pub mod session;

pub use session::{
    ConversationTurn, DEFAULT_SYSTEM_INSTRUCTION, RESPONSE_MIME_TYPE, Role, SUPPORTED_MODELS,
    Session, SessionSettings,
};
