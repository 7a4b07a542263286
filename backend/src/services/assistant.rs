//! Assistant Service
//!
//! Runs one conversational turn: gate the question, refuse or forward it
//! with the policy preamble, and record exactly one assistant turn.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::gate::{AllowList, ConfigurationError, RefusalLanguage};
use crate::models::{ConversationTurn, Session};
use crate::services::llm::{ChatCompletion, ChatRequest};

/// Shown when the model answers with no text
pub const NO_TEXT_PLACEHOLDER: &str = "(No text in response)";

/// How a reply was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Forwarded to the model, which answered
    Answered,
    /// Out of scope, answered with a fixed refusal
    Refused,
    /// Forwarded to the model, which failed
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Refused(RefusalLanguage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub kind: ReplyKind,
    /// Set for refusals only
    pub language: Option<RefusalLanguage>,
    pub text: String,
}

/// Read the policy preamble verbatim
pub fn read_policy_prompt(path: impl AsRef<Path>) -> Result<String, ConfigurationError> {
    let path = path.as_ref();
    let prompt = std::fs::read_to_string(path).map_err(|e| ConfigurationError::io(path, e))?;
    if prompt.trim().is_empty() {
        tracing::warn!("Policy preamble {} is empty", path.display());
    }
    Ok(prompt)
}

pub struct Assistant {
    allow_list: Arc<AllowList>,
    policy_prompt: String,
    llm: Arc<dyn ChatCompletion>,
}

impl Assistant {
    pub fn new(
        allow_list: Arc<AllowList>,
        policy_prompt: impl Into<String>,
        llm: Arc<dyn ChatCompletion>,
    ) -> Self {
        Self { allow_list, policy_prompt: policy_prompt.into(), llm }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Scope decision for `text`; pure
    pub fn gate(&self, text: &str) -> GateDecision {
        if self.allow_list.is_allowed(text) {
            GateDecision::Allowed
        } else {
            GateDecision::Refused(RefusalLanguage::detect(text))
        }
    }

    /// Wrap an in-scope question with the policy preamble
    pub fn build_prompt(&self, question: &str) -> String {
        format!(
            "{}\n\nUser question:\n{}\n\nReturn the answer following the FORMAT section.",
            self.policy_prompt, question
        )
    }

    /// Handle one inbound message.
    ///
    /// Appends the user turn, then exactly one assistant turn whose content is
    /// the returned text. Refused questions never reach the model, neither now
    /// nor as context for later calls: the model only sees earlier exchanges
    /// it answered. Model failures are reported in the reply text rather than
    /// as an error.
    pub async fn respond(&self, session: &mut Session, text: &str) -> Reply {
        session.push(ConversationTurn::user(text));

        let reply = match self.gate(text) {
            GateDecision::Refused(language) => {
                tracing::debug!("Question out of scope, refusing in '{}'", language.code());
                Reply {
                    kind: ReplyKind::Refused,
                    language: Some(language),
                    text: language.message().to_string(),
                }
            },
            GateDecision::Allowed => {
                let prompt = self.build_prompt(text);
                let request = ChatRequest::new(&session.settings, session.forwarded(), prompt.as_str());
                match self.llm.complete(&request).await {
                    Ok(answer) => {
                        let text = if answer.is_empty() {
                            NO_TEXT_PLACEHOLDER.to_string()
                        } else {
                            answer
                        };
                        session.record_exchange(prompt, text.as_str());
                        Reply { kind: ReplyKind::Answered, language: None, text }
                    },
                    Err(e) => {
                        tracing::warn!(
                            "Chat completion via {} failed (session {}): {}",
                            self.llm.provider(),
                            session.id,
                            e
                        );
                        Reply { kind: ReplyKind::Failed, language: None, text: format!("Error: {}", e) }
                    },
                }
            },
        };

        session.push(ConversationTurn::assistant(reply.text.clone()));
        reply
    }
}
