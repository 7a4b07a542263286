//! Chat API Handlers
//!
//! One process-wide conversation: every request reads or extends the same
//! session history.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;
use crate::gate::RefusalLanguage;
use crate::models::ConversationTurn;
use crate::services::ReplyKind;
use crate::utils::{ApiError, ApiResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessageResponse {
    pub answer: String,
    pub kind: ReplyKind,
    /// Refusal language, present only when the question was out of scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<RefusalLanguage>,
    /// Number of turns in the conversation after this exchange
    pub history_len: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearHistoryResponse {
    pub cleared: usize,
}

/// Ask a question
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Assistant reply (answer, refusal or error text)", body = ChatMessageResponse),
        (status = 400, description = "Empty message or malformed body"),
    ),
    tag = "Chat"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatMessageRequest>, JsonRejection>,
) -> ApiResult<Json<ChatMessageResponse>> {
    let Json(req) = payload?;
    if req.message.trim().is_empty() {
        return Err(ApiError::validation_error("message must not be empty"));
    }

    // Held across the model call so user/assistant turns stay paired
    let mut session = state.session.lock().await;
    let reply = state.assistant.respond(&mut session, &req.message).await;
    tracing::info!("Chat turn finished: kind={:?}, history_len={}", reply.kind, session.len());

    Ok(Json(ChatMessageResponse {
        answer: reply.text,
        kind: reply.kind,
        language: reply.language,
        history_len: session.len(),
    }))
}

/// Conversation history, oldest first
#[utoipa::path(
    get,
    path = "/api/history",
    responses(
        (status = 200, description = "Conversation turns", body = Vec<ConversationTurn>)
    ),
    tag = "Chat"
)]
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<ConversationTurn>> {
    let session = state.session.lock().await;
    Json(session.history().to_vec())
}

/// Start over with an empty conversation
#[utoipa::path(
    delete,
    path = "/api/history",
    responses(
        (status = 200, description = "History cleared", body = ClearHistoryResponse)
    ),
    tag = "Chat"
)]
pub async fn clear_history(State(state): State<Arc<AppState>>) -> Json<ClearHistoryResponse> {
    let mut session = state.session.lock().await;
    let cleared = session.len();
    session.clear();
    tracing::info!("Cleared {} turns from session {}", cleared, session.id);
    Json(ClearHistoryResponse { cleared })
}
