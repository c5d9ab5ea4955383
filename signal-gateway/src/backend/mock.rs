//! Mock LLM backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::traits::*;

enum Scripted {
    Reply(CompletionResponse),
    Failure(String),
}

/// Mock backend for testing.
///
/// Replies come from a script queue first, then fall back to a fixed
/// response. Every request is recorded for later inspection.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    capabilities: ModelCapabilities,
    response_content: String,
    usage: Option<Usage>,
    delay: Option<Duration>,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
    call_count: AtomicU32,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            capabilities: ModelCapabilities::default(),
            response_content: "Mock response".to_string(),
            usage: None,
            delay: None,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the fallback response content.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.response_content = content.into();
        self
    }

    /// Report fixed token usage instead of the length estimate.
    pub fn with_usage(mut self, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.usage = Some(Usage::new(prompt_tokens, completion_tokens));
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Set capabilities.
    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Queue a full response.
    pub async fn push_reply(&self, response: CompletionResponse) {
        self.script.lock().await.push_back(Scripted::Reply(response));
    }

    /// Queue a plain text reply.
    pub async fn push_text(&self, content: impl Into<String>) {
        let content = content.into();
        let usage = self.usage_for("", &content);
        self.push_reply(CompletionResponse::text(content, usage)).await;
    }

    /// Queue a failed call.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Failure(message.into()));
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    fn usage_for(&self, prompt: &str, completion: &str) -> Usage {
        self.usage.unwrap_or_else(|| {
            Usage::new(prompt.len() as u32 / 4, completion.len() as u32 / 4)
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock backend disabled".to_string()));
        }

        if let Some(next) = self.script.lock().await.pop_front() {
            return match next {
                Scripted::Reply(response) => Ok(response),
                Scripted::Failure(message) => Err(LlmError::RequestFailed(message)),
            };
        }

        let prompt: String = request.messages.iter().map(Message::text).collect();
        let usage = self.usage_for(&prompt, &self.response_content);
        Ok(CompletionResponse::text(self.response_content.clone(), usage))
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }
}
