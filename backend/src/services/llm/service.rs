//! Chat-completion seam between the assistant and a model provider.

use async_trait::async_trait;

use super::models::{ChatRequest, LLMError};

/// A hosted model that turns a conversation into a reply
///
/// Implementations own transport, authentication and provider quirks.
/// Retry and rate limiting, if any, also live behind this trait.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Generate the reply text for `request`
    async fn complete(&self, request: &ChatRequest) -> Result<String, LLMError>;

    /// Short provider name for logs
    fn provider(&self) -> &str;
}
