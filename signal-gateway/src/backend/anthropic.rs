//! Anthropic Messages API backend.
//!
//! Supports the provider's server-side web search tool. Search calls run on
//! the provider; the reply carries the tool blocks alongside the text.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::*;

const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    capabilities: ModelCapabilities,
}

impl AnthropicBackend {
    /// Create a backend against `base_url` (e.g. `https://api.anthropic.com`).
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(API_VERSION),
        );
        let mut key = header::HeaderValue::from_str(&api_key)
            .map_err(|e| LlmError::Unavailable(format!("Invalid API key header: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            capabilities: ModelCapabilities {
                supports_web_search: true,
                ..Default::default()
            },
        })
    }

    /// Set custom capabilities.
    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Messages API request body.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Value,
}

/// Messages API response.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<Value>,
    stop_reason: Option<String>,
    usage: Option<UsageResponse>,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    input_tokens: u32,
    output_tokens: u32,
}

fn wire_tool(tool: &Tool) -> Value {
    match tool {
        Tool::WebSearch { max_uses } => serde_json::json!({
            "type": "web_search_20250305",
            "name": "web_search",
            "max_uses": max_uses,
        }),
    }
}

fn wire_message(message: &Message) -> WireMessage {
    WireMessage {
        role: match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        },
        content: match &message.content {
            MessageContent::Text(text) => Value::String(text.clone()),
            MessageContent::Blocks(blocks) => Value::Array(blocks.clone()),
        },
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        if !self.has_key() {
            return false;
        }

        self.client
            .get(format!("{}/v1/models", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if !self.has_key() {
            return Err(LlmError::Unavailable("No API key configured".to_string()));
        }

        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: request.system_prompt.clone(),
            messages: request.messages.iter().map(wire_message).collect(),
            temperature: request.temperature,
            tools: request.tools.iter().map(wire_tool).collect(),
        };

        let response = self
            .client
            .post(self.messages_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();

            if status.as_u16() == 429 {
                let retry_after_ms = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs * 1000);
                return Err(LlmError::RateLimited { retry_after_ms });
            }

            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let finish_reason = match reply.stop_reason.as_deref() {
            Some("max_tokens") => FinishReason::Length,
            Some("tool_use") => FinishReason::ToolUse,
            Some("pause_turn") => FinishReason::PauseTurn,
            Some("refusal") => FinishReason::Refusal,
            _ => FinishReason::Stop,
        };

        let usage = reply
            .usage
            .map(|u| Usage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: text_of_blocks(&reply.content),
            blocks: reply.content,
            finish_reason,
            usage,
        })
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend(server: &MockServer) -> AnthropicBackend {
        AnthropicBackend::new(server.uri(), "claude-test", "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_complete_maps_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(json!({
                "model": "claude-test",
                "max_tokens": 512,
                "system": "Be brief",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "type": "text", "text": "{\"suggestions\": []}" }],
                "stop_reason": "end_turn",
                "usage": { "input_tokens": 42, "output_tokens": 7 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend(&server)
            .await
            .complete(
                CompletionRequest::user("Hi")
                    .with_system("Be brief")
                    .with_max_tokens(512),
            )
            .await
            .unwrap();

        assert_eq!(response.content, "{\"suggestions\": []}");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage, Usage::new(42, 7));
    }

    #[tokio::test]
    async fn test_web_search_tool_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(json!({
                "tools": [{ "type": "web_search_20250305", "name": "web_search", "max_uses": 3 }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "server_tool_use", "id": "srv_1", "name": "web_search", "input": { "query": "q" } },
                    { "type": "text", "text": "Searching" }
                ],
                "stop_reason": "pause_turn",
                "usage": { "input_tokens": 10, "output_tokens": 2 }
            })))
            .mount(&server)
            .await;

        let response = backend(&server)
            .await
            .complete(CompletionRequest::user("Find").with_tool(Tool::WebSearch { max_uses: 3 }))
            .await
            .unwrap();

        assert_eq!(response.finish_reason, FinishReason::PauseTurn);
        assert_eq!(response.blocks.len(), 2);
        assert_eq!(response.content, "Searching");
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
            .mount(&server)
            .await;

        let result = backend(&server)
            .await
            .complete(CompletionRequest::user("Hi"))
            .await;

        match result {
            Err(LlmError::RateLimited { retry_after_ms }) => assert_eq!(retry_after_ms, Some(2000)),
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let result = backend(&server)
            .await
            .complete(CompletionRequest::user("Hi"))
            .await;
        assert!(matches!(result, Err(LlmError::RequestFailed(msg)) if msg.contains("overloaded")));
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let backend = AnthropicBackend::new("http://localhost:1", "claude-test", "").unwrap();
        assert!(!backend.is_available().await);
        assert!(matches!(
            backend.complete(CompletionRequest::user("Hi")).await,
            Err(LlmError::Unavailable(_))
        ));
    }
}
