//! Signal AI Enrichment Gateway
//!
//! Stateless request handlers that turn workspace context into structured
//! suggestions:
//! - One authorization gate shared by every operation
//! - Trait-based text model and speech-to-text backends (Anthropic, Whisper)
//! - Deterministic extraction of JSON from free-text model replies
//! - Bounded web research for hypothesis suggestion
//! - The hypothesis status workflow and archetype rescoring
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          EnrichmentService              │
//! │  authorize → validate → context → model │
//! └───────┬──────────────┬──────────────┬───┘
//!         ▼              ▼              ▼
//! ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//! │  AuthGate   │ │ LlmBackend  │ │DocumentStore│
//! │ (JWT+role)  │ │ SpeechToText│ │ (context)   │
//! └─────────────┘ └─────────────┘ └─────────────┘
//! ```

pub mod auth;
pub mod backend;
pub mod context;
pub mod error;
pub mod extraction;
pub mod kind;
pub mod payload;
pub mod prompt;
pub mod research;
pub mod result;
pub mod service;
pub mod speech;
pub mod usage;
pub mod workflow;

// Re-export main types for convenience
pub use auth::{extract_token_from_header, AuthGate, Caller, JwtVerifier, TokenVerifier};
pub use backend::{AnthropicBackend, CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use error::{ErrorBody, ErrorKind, GatewayError};
pub use extraction::extract_json;
pub use kind::EnrichmentKind;
pub use payload::parse_payload;
pub use result::{Enriched, TokenUsage};
pub use service::{EnrichmentService, GatewayConfig};
pub use speech::{SpeechToText, WhisperBackend};
pub use usage::{UsageEntry, UsageLog, UsageStats};
pub use workflow::TransitionOutcome;
