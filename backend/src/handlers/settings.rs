use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use crate::AppState;
use crate::models::SessionSettings;
use crate::utils::{ApiError, ApiResult};

/// Current model selection and generation parameters
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Session settings", body = SessionSettings)
    ),
    tag = "Settings"
)]
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SessionSettings> {
    let session = state.session.lock().await;
    Json(session.settings.clone())
}

/// Replace the session settings; omitted fields take their defaults
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = SessionSettings,
    responses(
        (status = 200, description = "Updated settings", body = SessionSettings),
        (status = 400, description = "Validation error"),
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SessionSettings>, JsonRejection>,
) -> ApiResult<Json<SessionSettings>> {
    let Json(settings) = payload?;
    settings.check().map_err(ApiError::validation_error)?;

    let mut session = state.session.lock().await;
    tracing::info!(
        "Updating settings: model={}, temperature={}, top_p={}, top_k={}, max_output_tokens={}",
        settings.model,
        settings.temperature,
        settings.top_p,
        settings.top_k,
        settings.max_output_tokens
    );
    session.settings = settings;
    Ok(Json(session.settings.clone()))
}
