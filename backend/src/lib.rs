//! Janasampark
//!
//! A Maratha reservation help desk. Questions are checked against a curated
//! allow-list of topic phrases; in-scope questions are forwarded to the
//! Gemini chat API with a policy preamble, everything else gets a fixed
//! refusal in Marathi or English.

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repl;
pub mod services;
pub mod utils;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::gate::AllowList;
use crate::models::{Session, SessionSettings};
use crate::services::{Assistant, ChatCompletion, GeminiClient, read_policy_prompt};

/// Shared state for HTTP handlers
pub struct AppState {
    pub assistant: Assistant,
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(assistant: Assistant, settings: SessionSettings) -> Self {
        Self { assistant, session: Mutex::new(Session::new(settings)) }
    }
}

/// Build the assistant from configuration.
///
/// Reads the allow-list and policy preamble once; any failure here is a
/// configuration error and must stop the process.
pub fn build_assistant(config: &Config) -> anyhow::Result<Assistant> {
    let allow_list = AllowList::from_file(&config.assistant.allow_pattern_path)?;
    tracing::info!(
        "Loaded allow-list from {} ({} phrases)",
        config.assistant.allow_pattern_path,
        allow_list.phrase_count()
    );
    tracing::debug!("Allow-list phrases: {}", allow_list.phrases().join(" | "));

    let policy_prompt = read_policy_prompt(&config.assistant.policy_prompt_path)?;
    tracing::info!(
        "Loaded policy preamble from {} ({} bytes)",
        config.assistant.policy_prompt_path,
        policy_prompt.len()
    );

    let client = GeminiClient::new(&config.llm)?;
    if !client.has_api_key() {
        tracing::warn!("⚠️  No chat API key configured (set GOOGLE_API_KEY)");
        tracing::warn!("⚠️  In-scope questions will be answered with an error message");
    }

    let llm: Arc<dyn ChatCompletion> = Arc::new(client);
    Ok(Assistant::new(Arc::new(allow_list), policy_prompt, llm))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::chat::send_message,
        handlers::chat::get_history,
        handlers::chat::clear_history,
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::status::health,
    ),
    components(schemas(
        handlers::chat::ChatMessageRequest,
        handlers::chat::ChatMessageResponse,
        handlers::chat::ClearHistoryResponse,
        handlers::status::HealthResponse,
        models::ConversationTurn,
        models::Role,
        models::SessionSettings,
        services::ReplyKind,
        gate::RefusalLanguage,
    )),
    tags(
        (name = "Chat", description = "Topic-gated conversation"),
        (name = "Settings", description = "Model selection and generation parameters"),
        (name = "Status", description = "Service status"),
    )
)]
pub struct ApiDoc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/chat", post(handlers::chat::send_message))
        .route(
            "/api/history",
            get(handlers::chat::get_history).delete(handlers::chat::clear_history),
        )
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/api/health", get(handlers::status::health))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(middleware::locale_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
