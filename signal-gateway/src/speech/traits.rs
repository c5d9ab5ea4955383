//! Speech-to-text abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Transcription unavailable: {0}")]
    Unavailable(String),

    #[error("Transcription request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Turns recorded audio into timed text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    fn id(&self) -> &str;

    /// Transcribe `audio`, declared as `mime_type`.
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<Transcript, TranscriptionError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub text: String,
    /// Detected language
    #[serde(default)]
    pub language: String,
    /// Audio length in seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub words: Vec<TranscriptWord>,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default)]
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
}
