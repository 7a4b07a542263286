pub mod assistant;
pub mod llm;

pub use assistant::{Assistant, GateDecision, NO_TEXT_PLACEHOLDER, Reply, ReplyKind, read_policy_prompt};
pub use llm::{ChatCompletion, GeminiClient, LLMError};
