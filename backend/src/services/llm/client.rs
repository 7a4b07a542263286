//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

use super::models::{ChatRequest, GeminiErrorEnvelope, GeminiRequest, GeminiResponse, LLMError};
use super::service::ChatCompletion;
use crate::config::LLMConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http_client: Client,
    api_base: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &LLMConfig) -> Result<Self, LLMError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::ClientSetup(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, urlencoding::encode(model))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> LLMError {
        if err.is_timeout() {
            LLMError::Timeout(self.timeout_secs)
        } else {
            LLMError::ApiError(err.to_string())
        }
    }

    fn map_status(status: StatusCode, body: &str) -> LLMError {
        let detail = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .map(|e| match e.error.status {
                Some(s) if !e.error.message.is_empty() => format!("{} ({})", e.error.message, s),
                Some(s) => s,
                None => e.error.message,
            })
            .unwrap_or_else(|_| body.trim().chars().take(300).collect());

        match status {
            StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimited(detail),
            _ => LLMError::ApiError(format!("HTTP {}: {}", status.as_u16(), detail)),
        }
    }
}

#[async_trait]
impl ChatCompletion for GeminiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LLMError> {
        let api_key = self.api_key.as_deref().ok_or(LLMError::NoApiKey)?;
        let url = self.endpoint(&request.model);
        let body = GeminiRequest::from(request);

        tracing::debug!(
            "Calling Gemini: model={}, history={} turns",
            request.model,
            request.history.len()
        );
        let t0 = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            tracing::warn!("Gemini returned HTTP {}", status.as_u16());
            return Err(Self::map_status(status, &text));
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&text).map_err(|e| LLMError::ParseError(e.to_string()))?;

        tracing::debug!("Gemini responded in {}ms", t0.elapsed().as_millis());
        parsed.into_text()
    }

    fn provider(&self) -> &str {
        "gemini"
    }
}
