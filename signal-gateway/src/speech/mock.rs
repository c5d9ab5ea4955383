//! Mock transcriber for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

use super::traits::*;

pub struct MockTranscriber {
    transcript: Transcript,
    fail_with: Option<String>,
    call_count: AtomicU32,
    received: Mutex<Vec<(usize, String)>>,
}

impl MockTranscriber {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            transcript: Transcript {
                text: text.into(),
                language: "english".to_string(),
                ..Default::default()
            },
            fail_with: None,
            call_count: AtomicU32::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    /// Fail every call with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// `(byte length, mime type)` of every call.
    pub async fn received(&self) -> Vec<(usize, String)> {
        self.received.lock().await.clone()
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new("Mock transcript")
    }
}

#[async_trait]
impl SpeechToText for MockTranscriber {
    fn id(&self) -> &str {
        "mock-transcriber"
    }

    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<Transcript, TranscriptionError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .await
            .push((audio.len(), mime_type.to_string()));

        match &self.fail_with {
            Some(message) => Err(TranscriptionError::RequestFailed(message.clone())),
            None => Ok(self.transcript.clone()),
        }
    }
}
