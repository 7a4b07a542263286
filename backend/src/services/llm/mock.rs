//! Scripted chat provider for tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::models::{ChatRequest, LLMError};
use super::service::ChatCompletion;

/// Replays queued results and records every request it receives.
/// Once the queue is drained it answers `"ok"`.
#[derive(Default)]
pub struct MockChat {
    replies: Mutex<VecDeque<Result<String, LLMError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, err: LLMError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for MockChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LLMError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }

    fn provider(&self) -> &str {
        "mock"
    }
}
