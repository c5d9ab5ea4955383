//! OpenAI-compatible `/audio/transcriptions` backend.
//!
//! Requests verbose JSON with word and segment timestamps.

use async_trait::async_trait;
use reqwest::{header, multipart, Client};
use serde::Deserialize;

use super::traits::*;

pub struct WhisperBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl WhisperBackend {
    /// Create a backend against `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, TranscriptionError> {
        let client = Client::builder().build().map_err(|e| {
            TranscriptionError::Unavailable(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

/// File extension the provider expects for a MIME type.
fn file_name(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/webm" => "audio.webm",
        "audio/mp3" | "audio/mpeg" => "audio.mp3",
        "audio/mp4" => "audio.mp4",
        "audio/wav" | "audio/x-wav" => "audio.wav",
        "audio/m4a" | "audio/x-m4a" => "audio.m4a",
        "audio/ogg" => "audio.ogg",
        _ => "audio.bin",
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    words: Vec<TranscriptWord>,
    #[serde(default)]
    segments: Vec<TranscriptSegment>,
}

#[async_trait]
impl SpeechToText for WhisperBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<Transcript, TranscriptionError> {
        if self.api_key.is_empty() {
            return Err(TranscriptionError::Unavailable(
                "No API key configured".to_string(),
            ));
        }

        let part = multipart::Part::bytes(audio)
            .file_name(file_name(mime_type))
            .mime_str(mime_type)
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("timestamp_granularities[]", "segment");

        let response = self
            .client
            .post(self.transcriptions_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let reply: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

        Ok(Transcript {
            text: reply.text,
            language: reply.language,
            duration: reply.duration,
            words: reply.words,
            segments: reply.segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_transcribe_verbose_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "hello there",
                "language": "english",
                "duration": 1.5,
                "words": [
                    { "word": "hello", "start": 0.0, "end": 0.6 },
                    { "word": "there", "start": 0.7, "end": 1.2 }
                ],
                "segments": [{ "id": 0, "start": 0.0, "end": 1.2, "text": "hello there" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = WhisperBackend::new(server.uri(), "whisper-1", "sk-test").unwrap();
        let transcript = backend
            .transcribe(vec![1, 2, 3], "audio/webm")
            .await
            .unwrap();

        assert_eq!(transcript.text, "hello there");
        assert_eq!(transcript.words.len(), 2);
        assert_eq!(transcript.segments[0].text, "hello there");
    }

    #[tokio::test]
    async fn test_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad audio"))
            .mount(&server)
            .await;

        let backend = WhisperBackend::new(server.uri(), "whisper-1", "sk-test").unwrap();
        let result = backend.transcribe(vec![0], "audio/wav").await;
        assert!(matches!(result, Err(TranscriptionError::RequestFailed(msg)) if msg.contains("bad audio")));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name("audio/mpeg"), "audio.mp3");
        assert_eq!(file_name("audio/x-m4a"), "audio.m4a");
    }
}
