//! Core traits for LLM backends.
//!
//! This module defines the `LlmBackend` trait, the abstraction over the
//! text-generation provider used by every enrichment operation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error types for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Backend is not available
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Rate limited by the backend
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Core trait for LLM backends.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Get the backend identifier (e.g., model name).
    fn id(&self) -> &str;

    /// Check if the backend is currently available.
    async fn is_available(&self) -> bool;

    /// Generate a completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &ModelCapabilities;
}

/// Request for LLM completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt (optional)
    pub system_prompt: Option<String>,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0-1.0)
    pub temperature: Option<f32>,
    /// Provider-side tools the model may call
    pub tools: Vec<Tool>,
}

impl CompletionRequest {
    /// Create a new request with a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
            ..Default::default()
        }
    }

    /// Add a system prompt.
    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Add a message.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp.clamp(0.0, 1.0));
        self
    }

    /// Offer a tool to the model.
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: MessageContent,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Replay provider content blocks from an earlier assistant turn.
    pub fn assistant_blocks(blocks: Vec<Value>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Plain text of the message, ignoring non-text blocks.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => text_of_blocks(blocks),
        }
    }
}

/// Message body: plain text, or raw provider content blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<Value>),
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Tools executed on the provider side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Web search, capped at `max_uses` searches per request
    WebSearch { max_uses: u32 },
}

/// Response from LLM completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Concatenated text blocks
    pub content: String,
    /// Raw content blocks, kept for replaying tool turns
    #[serde(default)]
    pub blocks: Vec<Value>,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Token usage
    pub usage: Usage,
}

impl CompletionResponse {
    /// A plain text response with no tool blocks.
    pub fn text(content: impl Into<String>, usage: Usage) -> Self {
        let content = content.into();
        Self {
            blocks: vec![serde_json::json!({ "type": "text", "text": content })],
            content,
            finish_reason: FinishReason::Stop,
            usage,
        }
    }

    /// Whether the model wants the turn continued.
    pub fn wants_continuation(&self) -> bool {
        matches!(self.finish_reason, FinishReason::ToolUse | FinishReason::PauseTurn)
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response or stop sequence)
    Stop,
    /// Hit max tokens limit
    Length,
    /// Model requested a tool call
    ToolUse,
    /// Long-running server tool turn paused; resend to continue
    PauseTurn,
    /// Model declined to answer
    Refusal,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Get total tokens.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Capabilities of a model/backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCapabilities {
    /// Maximum context window size
    pub context_window: u32,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Whether the provider runs web search server-side
    pub supports_web_search: bool,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            context_window: 200_000,
            max_output_tokens: 8192,
            supports_web_search: false,
        }
    }
}

/// Join the `text` blocks of a provider reply.
pub fn text_of_blocks(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::user("Hello")
            .with_system("Be brief")
            .with_max_tokens(256)
            .with_temperature(3.0)
            .with_tool(Tool::WebSearch { max_uses: 3 });

        assert_eq!(request.system_prompt.as_deref(), Some("Be brief"));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(1.0));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.tools.len(), 1);
    }

    #[test]
    fn test_text_of_blocks_skips_tool_blocks() {
        let blocks = vec![
            json!({ "type": "server_tool_use", "id": "t1", "name": "web_search" }),
            json!({ "type": "text", "text": "Found " }),
            json!({ "type": "web_search_tool_result", "content": [] }),
            json!({ "type": "text", "text": "three sources" }),
        ];
        assert_eq!(text_of_blocks(&blocks), "Found three sources");
        assert_eq!(Message::assistant_blocks(blocks).text(), "Found three sources");
    }

    #[test]
    fn test_continuation() {
        let mut response = CompletionResponse::text("partial", Usage::default());
        assert!(!response.wants_continuation());
        response.finish_reason = FinishReason::PauseTurn;
        assert!(response.wants_continuation());
    }
}
