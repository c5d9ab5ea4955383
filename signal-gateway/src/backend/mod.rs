//! LLM backend abstraction layer.
//!
//! - Anthropic Messages API, with server-side web search
//! - Mock backend for testing

pub mod anthropic;
pub mod mock;
pub mod traits;

pub use anthropic::AnthropicBackend;
pub use mock::MockBackend;
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Message,
    ModelCapabilities, Tool, Usage,
};
