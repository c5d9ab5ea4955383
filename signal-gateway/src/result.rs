//! Result shapes returned by enrichment operations.
//!
//! Model replies are parsed into the `*Reply` / draft types; the service then
//! wraps them under the key the caller expects and attaches token usage.

use serde::{Deserialize, Serialize};

use signal_model::JourneyStep;

use crate::backend::Usage;
use crate::speech::Transcript;

/// Token usage attached to every successful result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl From<Usage> for TokenUsage {
    fn from(usage: Usage) -> Self {
        Self {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }
    }
}

/// `{...result, usage}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enriched<T> {
    #[serde(flatten)]
    pub result: T,
    pub usage: TokenUsage,
}

impl<T> Enriched<T> {
    pub fn new(result: T, usage: impl Into<TokenUsage>) -> Self {
        Self {
            result,
            usage: usage.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategicContextEnrichment {
    pub content: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyContextDraft {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub industry: String,
    pub summary: String,
    #[serde(default)]
    pub target_market: String,
    #[serde(default)]
    pub business_model: String,
    #[serde(default)]
    pub competitors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyContextResult {
    pub company_context: CompanyContextDraft,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyMapDraft {
    pub title: String,
    pub steps: Vec<JourneyStep>,
}

impl JourneyMapDraft {
    /// Renumber steps in reply order, starting at 1.
    pub fn normalized(mut self) -> Self {
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.order = i as u32 + 1;
            step.negative_experience = step.negative_experience.clamp(1, 5);
            step.positive_experience = step.positive_experience.clamp(1, 5);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyMapResult {
    pub journey_map: JourneyMapDraft,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedJourneyMap {
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey_map: Option<JourneyMapDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    /// 1 to 10
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueResult {
    pub critique: Critique,
}

/// Assumption statements grouped by archetype list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssumptionDraft {
    pub pain_points: Vec<String>,
    pub solutions: Vec<String>,
    pub goals: Vec<String>,
    pub metrics: Vec<String>,
    pub buying_criteria: Vec<String>,
    pub objections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionResult {
    pub assumptions: AssumptionDraft,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_hypothesis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestions {
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSynthesis {
    pub summary: String,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub hypothesis_updates: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub synthesis: InterviewSynthesis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptAnalysis {
    pub summary: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub objections: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default)]
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: TranscriptAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisSuggestion {
    pub belief: String,
    #[serde(default)]
    pub test: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisSuggestions {
    pub suggestions: Vec<HypothesisSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub transcript: Transcript,
}
