//! Enrichment operation kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shape of the JSON value expected in a model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    Object,
    Array,
}

impl ReplyShape {
    pub fn brackets(&self) -> (char, char) {
        match self {
            Self::Object => ('{', '}'),
            Self::Array => ('[', ']'),
        }
    }
}

/// Timeout class of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Light,
    Heavy,
    Audio,
}

/// The thirteen enrichment operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentKind {
    GenerateVision,
    RewriteProblemStatement,
    EnrichStrategicContext,
    EnrichCompanyContext,
    GenerateJourneyMap,
    DetectJourneyMap,
    CritiqueArchetypeInput,
    ExtractArchetypeAssumptions,
    GenerateInterviewQuestions,
    SynthesizeInterview,
    AnalyzeTranscript,
    SuggestHypotheses,
    TranscribeAudio,
}

impl EnrichmentKind {
    pub fn all() -> [Self; 13] {
        [
            Self::GenerateVision,
            Self::RewriteProblemStatement,
            Self::EnrichStrategicContext,
            Self::EnrichCompanyContext,
            Self::GenerateJourneyMap,
            Self::DetectJourneyMap,
            Self::CritiqueArchetypeInput,
            Self::ExtractArchetypeAssumptions,
            Self::GenerateInterviewQuestions,
            Self::SynthesizeInterview,
            Self::AnalyzeTranscript,
            Self::SuggestHypotheses,
            Self::TranscribeAudio,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateVision => "generate-vision",
            Self::RewriteProblemStatement => "rewrite-problem-statement",
            Self::EnrichStrategicContext => "enrich-strategic-context",
            Self::EnrichCompanyContext => "enrich-company-context",
            Self::GenerateJourneyMap => "generate-journey-map",
            Self::DetectJourneyMap => "detect-journey-map",
            Self::CritiqueArchetypeInput => "critique-archetype-input",
            Self::ExtractArchetypeAssumptions => "extract-archetype-assumptions",
            Self::GenerateInterviewQuestions => "generate-interview-questions",
            Self::SynthesizeInterview => "synthesize-interview",
            Self::AnalyzeTranscript => "analyze-transcript",
            Self::SuggestHypotheses => "suggest-hypotheses",
            Self::TranscribeAudio => "transcribe-audio",
        }
    }

    pub fn weight(&self) -> Weight {
        match self {
            Self::GenerateJourneyMap
            | Self::DetectJourneyMap
            | Self::SynthesizeInterview
            | Self::AnalyzeTranscript
            | Self::SuggestHypotheses => Weight::Heavy,
            Self::TranscribeAudio => Weight::Audio,
            _ => Weight::Light,
        }
    }

    /// Output bound for the model call. Zero for transcription, which does
    /// not use the text model.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::GenerateVision | Self::RewriteProblemStatement => 1024,
            Self::CritiqueArchetypeInput => 1024,
            Self::EnrichStrategicContext | Self::EnrichCompanyContext => 1500,
            Self::ExtractArchetypeAssumptions | Self::GenerateInterviewQuestions => 2048,
            Self::SynthesizeInterview | Self::AnalyzeTranscript | Self::SuggestHypotheses => 3000,
            Self::GenerateJourneyMap | Self::DetectJourneyMap => 4096,
            Self::TranscribeAudio => 0,
        }
    }

    pub fn reply_shape(&self) -> ReplyShape {
        match self {
            Self::GenerateInterviewQuestions | Self::SuggestHypotheses => ReplyShape::Array,
            _ => ReplyShape::Object,
        }
    }

    /// What a failed parse is reported as, e.g. "Failed to parse vision suggestions".
    pub fn parse_subject(&self) -> &'static str {
        match self {
            Self::GenerateVision => "vision suggestions",
            Self::RewriteProblemStatement => "problem statement suggestions",
            Self::EnrichStrategicContext => "strategic context",
            Self::EnrichCompanyContext => "company context",
            Self::GenerateJourneyMap => "journey map",
            Self::DetectJourneyMap => "journey map detection",
            Self::CritiqueArchetypeInput => "critique",
            Self::ExtractArchetypeAssumptions => "archetype assumptions",
            Self::GenerateInterviewQuestions => "interview questions",
            Self::SynthesizeInterview => "interview synthesis",
            Self::AnalyzeTranscript => "transcript analysis",
            Self::SuggestHypotheses => "hypothesis suggestions",
            Self::TranscribeAudio => "transcript",
        }
    }

    /// What a failed call is reported as, e.g. "Failed to generate journey map".
    pub fn action(&self) -> &'static str {
        match self {
            Self::GenerateVision => "generate vision suggestions",
            Self::RewriteProblemStatement => "rewrite problem statement",
            Self::EnrichStrategicContext => "enrich strategic context",
            Self::EnrichCompanyContext => "enrich company context",
            Self::GenerateJourneyMap => "generate journey map",
            Self::DetectJourneyMap => "detect journey map",
            Self::CritiqueArchetypeInput => "critique archetype input",
            Self::ExtractArchetypeAssumptions => "extract archetype assumptions",
            Self::GenerateInterviewQuestions => "generate interview questions",
            Self::SynthesizeInterview => "synthesize interview",
            Self::AnalyzeTranscript => "analyze transcript",
            Self::SuggestHypotheses => "suggest hypotheses",
            Self::TranscribeAudio => "transcribe audio",
        }
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown enrichment kind: {0}")]
pub struct UnknownEnrichment(pub String);

impl FromStr for EnrichmentKind {
    type Err = UnknownEnrichment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownEnrichment(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for kind in EnrichmentKind::all() {
            assert_eq!(kind.as_str().parse::<EnrichmentKind>().unwrap(), kind);
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
        assert!("summon-dragon".parse::<EnrichmentKind>().is_err());
    }

    #[test]
    fn test_weights_and_shapes() {
        assert_eq!(EnrichmentKind::GenerateVision.weight(), Weight::Light);
        assert_eq!(EnrichmentKind::GenerateJourneyMap.weight(), Weight::Heavy);
        assert_eq!(EnrichmentKind::TranscribeAudio.weight(), Weight::Audio);
        assert_eq!(
            EnrichmentKind::SuggestHypotheses.reply_shape(),
            ReplyShape::Array
        );
        assert_eq!(
            EnrichmentKind::EnrichStrategicContext.reply_shape(),
            ReplyShape::Object
        );
    }
}
