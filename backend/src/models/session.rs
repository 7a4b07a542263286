use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Models offered to the user
pub const SUPPORTED_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-2.5-flash"];

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a concise, helpful assistant.";

/// Response format requested from the model
pub const RESPONSE_MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), created_at: Utc::now() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), created_at: Utc::now() }
    }
}

/// Model selection and generation parameters chosen for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SessionSettings {
    /// One of `SUPPORTED_MODELS`
    pub model: String,
    #[validate(length(min = 1, max = 4000))]
    pub system_instruction: String,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f32,
    #[validate(range(min = 1, max = 100))]
    pub top_k: u32,
    #[validate(range(min = 32, max = 2048))]
    pub max_output_tokens: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: SUPPORTED_MODELS[0].to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 512,
        }
    }
}

impl SessionSettings {
    /// Field ranges plus the model allow-list
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        if !SUPPORTED_MODELS.contains(&self.model.as_str()) {
            return Err(format!(
                "model: unsupported model '{}' (expected one of {})",
                self.model,
                SUPPORTED_MODELS.join(", ")
            ));
        }
        Ok(())
    }
}

/// Conversation state owned by whoever drives the conversation.
///
/// History only ever grows by paired user/assistant turns and is dropped
/// with the session; nothing is persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub settings: SessionSettings,
    history: Vec<ConversationTurn>,
    /// Exchanges the model has seen, with the wrapped prompt as the user part.
    /// Refused questions never land here.
    forwarded: Vec<ConversationTurn>,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self { id: Uuid::new_v4(), settings, history: Vec::new(), forwarded: Vec::new() }
    }

    /// Everything shown to the user, refusals included
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.history.push(turn);
    }

    /// Context for the next model call
    pub fn forwarded(&self) -> &[ConversationTurn] {
        &self.forwarded
    }

    pub fn record_exchange(&mut self, prompt: impl Into<String>, answer: impl Into<String>) {
        self.forwarded.push(ConversationTurn::user(prompt));
        self.forwarded.push(ConversationTurn::assistant(answer));
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.forwarded.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}
