use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Number of compiled allow-list phrases
    pub phrases: usize,
    pub model: String,
    pub history_len: usize,
}

/// Liveness and gate summary
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Status"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let session = state.session.lock().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        phrases: state.assistant.allow_list().phrase_count(),
        model: session.settings.model.clone(),
        history_len: session.len(),
    })
}
