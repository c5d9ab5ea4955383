//! Request payloads and their validation.
//!
//! Payload fields are all optional at the serde level so that a missing
//! required field is reported by name as `InvalidArgument`, before any
//! context read or model call.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

/// Audio MIME types accepted for transcription.
pub const SUPPORTED_AUDIO_TYPES: &[&str] = &[
    "audio/webm",
    "audio/mp3",
    "audio/mpeg",
    "audio/mp4",
    "audio/wav",
    "audio/x-wav",
    "audio/m4a",
    "audio/x-m4a",
    "audio/ogg",
];

pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const MAX_QUESTION_COUNT: u32 = 20;

/// Decode a raw JSON payload. `null` is treated as an empty object.
pub fn parse_payload<P: DeserializeOwned + Default>(payload: Value) -> Result<P, GatewayError> {
    if payload.is_null() {
        return Ok(P::default());
    }
    serde_json::from_value(payload).map_err(|e| GatewayError::invalid("payload", e.to_string()))
}

/// A required, non-blank string field.
pub fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, GatewayError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GatewayError::missing(field)),
    }
}

/// An optional string field; blank counts as absent.
pub fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateVisionPayload {
    pub current_vision: Option<String>,
    pub company_context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteProblemStatementPayload {
    pub problem_statement: Option<String>,
    pub title: Option<String>,
}

/// Sections of the strategic-context document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategicSection {
    Vision,
    Mission,
    TargetMarket,
    CompetitiveLandscape,
    Differentiators,
    Constraints,
}

impl StrategicSection {
    pub const ALL: [StrategicSection; 6] = [
        Self::Vision,
        Self::Mission,
        Self::TargetMarket,
        Self::CompetitiveLandscape,
        Self::Differentiators,
        Self::Constraints,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vision => "vision",
            Self::Mission => "mission",
            Self::TargetMarket => "targetMarket",
            Self::CompetitiveLandscape => "competitiveLandscape",
            Self::Differentiators => "differentiators",
            Self::Constraints => "constraints",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Vision => "Vision",
            Self::Mission => "Mission",
            Self::TargetMarket => "Target market",
            Self::CompetitiveLandscape => "Competitive landscape",
            Self::Differentiators => "Differentiators",
            Self::Constraints => "Constraints",
        }
    }

    pub fn parse(value: &str) -> Result<Self, GatewayError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                GatewayError::invalid("section", format!("must be one of {}", names.join(", ")))
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichStrategicContextPayload {
    pub section: Option<String>,
    pub current_content: Option<String>,
    pub company_context: Option<String>,
}

impl EnrichStrategicContextPayload {
    pub fn section(&self) -> Result<StrategicSection, GatewayError> {
        StrategicSection::parse(required(&self.section, "section")?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichCompanyContextPayload {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateJourneyMapPayload {
    pub archetype_id: Option<String>,
    pub idea_id: Option<String>,
    pub scenario: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectJourneyMapPayload {
    pub transcript: Option<String>,
    pub archetype_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CritiqueArchetypeInputPayload {
    pub field: Option<String>,
    pub content: Option<String>,
    pub archetype_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractArchetypeAssumptionsPayload {
    pub description: Option<String>,
    pub archetype_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateInterviewQuestionsPayload {
    pub archetype_id: Option<String>,
    pub count: Option<u32>,
}

impl GenerateInterviewQuestionsPayload {
    pub fn count(&self) -> Result<u32, GatewayError> {
        match self.count {
            None => Ok(DEFAULT_QUESTION_COUNT),
            Some(n) if (1..=MAX_QUESTION_COUNT).contains(&n) => Ok(n),
            Some(_) => Err(GatewayError::invalid(
                "count",
                format!("must be between 1 and {}", MAX_QUESTION_COUNT),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesizeInterviewPayload {
    pub notes: Option<String>,
    pub archetype_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeTranscriptPayload {
    pub transcript: Option<String>,
    pub archetype_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestHypothesesPayload {
    pub focus_area_id: Option<String>,
    pub archetype_id: Option<String>,
    pub web_search: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscribeAudioPayload {
    /// Base64-encoded audio
    pub audio: Option<String>,
    pub mime_type: Option<String>,
}

impl TranscribeAudioPayload {
    /// The declared MIME type, checked against the supported set.
    pub fn mime_type(&self) -> Result<&str, GatewayError> {
        let mime = required(&self.mime_type, "mimeType")?;
        if !SUPPORTED_AUDIO_TYPES.contains(&mime) {
            return Err(GatewayError::invalid(
                "mimeType",
                format!("unsupported audio type {}", mime),
            ));
        }
        Ok(mime)
    }

    /// The decoded audio bytes.
    pub fn audio(&self) -> Result<Vec<u8>, GatewayError> {
        let encoded = required(&self.audio, "audio")?;
        // Accept data URLs as produced by browser recorders
        let encoded = match encoded.split_once(";base64,") {
            Some((_, data)) => data,
            None => encoded,
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| GatewayError::invalid("audio", format!("not valid base64: {}", e)))?;
        if bytes.is_empty() {
            return Err(GatewayError::invalid("audio", "is empty"));
        }
        Ok(bytes)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionHypothesisPayload {
    pub hypothesis_id: Option<String>,
    pub status: Option<String>,
    /// Defaults to true
    pub auto_generate_decision: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RescoreArchetypePayload {
    pub archetype_id: Option<String>,
}
