//! LLM request/response models
//!
//! `ChatRequest` is the provider-neutral request built by the assistant.
//! The `Gemini*` types mirror the `generateContent` wire format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ConversationTurn, RESPONSE_MIME_TYPE, Role, SessionSettings};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API key missing")]
    NoApiKey,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Prompt blocked by provider: {0}")]
    Blocked(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

// ============================================================================
// Provider-neutral request
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        let role = match turn.role {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Model,
        };
        Self { role, text: turn.content.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl From<&SessionSettings> for GenerationConfig {
    fn from(s: &SessionSettings) -> Self {
        Self {
            temperature: s.temperature,
            top_p: s.top_p,
            top_k: s.top_k,
            max_output_tokens: s.max_output_tokens,
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    /// Earlier turns, oldest first
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub generation: GenerationConfig,
}

impl ChatRequest {
    pub fn new(settings: &SessionSettings, history: &[ConversationTurn], message: impl Into<String>) -> Self {
        let system_instruction = Some(settings.system_instruction.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            model: settings.model.clone(),
            system_instruction,
            history: history.iter().map(ChatMessage::from).collect(),
            message: message.into(),
            generation: GenerationConfig::from(settings),
        }
    }
}

// ============================================================================
// Gemini wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub generation_config: GenerationConfig,
}

impl From<&ChatRequest> for GeminiRequest {
    fn from(req: &ChatRequest) -> Self {
        let mut contents: Vec<GeminiContent> = req
            .history
            .iter()
            .map(|m| GeminiContent::text(Some(m.role), &m.text))
            .collect();
        contents.push(GeminiContent::text(Some(ChatRole::User), &req.message));

        Self {
            contents,
            system_instruction: req.system_instruction.as_deref().map(|s| GeminiContent::text(None, s)),
            generation_config: req.generation.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn text(role: Option<ChatRole>, text: &str) -> Self {
        Self {
            role: role.map(|r| r.as_str().to_string()),
            parts: vec![GeminiPart { text: Some(text.to_string()) }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GeminiResponse {
    /// Text of the first candidate, parts concatenated
    pub fn into_text(self) -> Result<String, LLMError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => LLMError::Blocked(reason),
                None => LLMError::ParseError("response contained no candidates".to_string()),
            });
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            tracing::debug!("Gemini finish reason: {}", reason);
        }

        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorEnvelope {
    pub error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
