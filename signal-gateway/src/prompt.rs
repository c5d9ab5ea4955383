//! Prompt assembly for enrichment operations.
//!
//! Prompts are plain text built from `# HEADER` sections. Optional context
//! that is absent or empty produces no section at all.

use signal_model::{CustomerArchetype, FocusArea, Hypothesis};

use crate::kind::EnrichmentKind;

/// Builds a user prompt section by section.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    prompt: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, header: &str, body: impl AsRef<str>) -> Self {
        let body = body.as_ref().trim();
        self.prompt.push_str(&format!("# {}\n\n{}\n\n", header.to_uppercase(), body));
        self
    }

    /// Adds the section only when `body` is present and not blank.
    pub fn optional_section(self, header: &str, body: Option<impl AsRef<str>>) -> Self {
        match body {
            Some(body) if !body.as_ref().trim().is_empty() => self.section(header, body),
            _ => self,
        }
    }

    /// Adds a bullet list section, skipped when empty.
    pub fn list_section<I, S>(self, header: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let body: Vec<String> = items
            .into_iter()
            .map(|item| format!("- {}", item.as_ref()))
            .collect();
        if body.is_empty() {
            return self;
        }
        self.section(header, body.join("\n"))
    }

    /// Closing instruction with the expected JSON shape.
    pub fn instruction(mut self, text: &str, shape: &str) -> Self {
        self.prompt.push_str("# TASK\n\n");
        self.prompt.push_str(text.trim());
        self.prompt.push_str("\n\nRespond with JSON only, in this shape:\n\n```json\n");
        self.prompt.push_str(shape.trim());
        self.prompt.push_str("\n```\n");
        self
    }

    pub fn build(self) -> String {
        self.prompt
    }
}

/// Short role statement sent as the system prompt.
pub fn system_prompt(kind: EnrichmentKind) -> &'static str {
    match kind {
        EnrichmentKind::GenerateVision
        | EnrichmentKind::EnrichStrategicContext
        | EnrichmentKind::EnrichCompanyContext => {
            "You are a product strategy advisor. You write concise, concrete statements grounded in the company's context."
        }
        EnrichmentKind::RewriteProblemStatement => {
            "You are a product discovery coach. Problem statements describe a customer's problem, never a solution."
        }
        EnrichmentKind::GenerateJourneyMap | EnrichmentKind::DetectJourneyMap => {
            "You are a customer experience researcher who maps customer journeys step by step."
        }
        EnrichmentKind::CritiqueArchetypeInput | EnrichmentKind::ExtractArchetypeAssumptions => {
            "You are a customer research lead reviewing archetype definitions for clarity and testability."
        }
        EnrichmentKind::GenerateInterviewQuestions
        | EnrichmentKind::SynthesizeInterview
        | EnrichmentKind::AnalyzeTranscript => {
            "You are an expert customer interviewer. You favour open questions about past behaviour over opinions about the future."
        }
        EnrichmentKind::SuggestHypotheses => {
            "You are a product discovery coach. Hypotheses are falsifiable beliefs paired with a cheap test."
        }
        EnrichmentKind::TranscribeAudio => "",
    }
}

pub fn describe_focus_area(focus: &FocusArea) -> String {
    let mut out = format!("{} (id: {})", focus.title, focus.id);
    if !focus.problem_statement.is_empty() {
        out.push_str(&format!(": {}", focus.problem_statement));
    }
    out
}

pub fn describe_archetype(archetype: &CustomerArchetype) -> String {
    let mut out = format!("Name: {} (id: {})\n", archetype.name, archetype.id);
    if !archetype.stakeholder_role.is_empty() {
        out.push_str(&format!("Role: {}\n", archetype.stakeholder_role));
    }
    if !archetype.phase.is_empty() {
        out.push_str(&format!("Phase: {}\n", archetype.phase));
    }
    for (label, items) in archetype.assumption_lists() {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", label));
        for item in items {
            out.push_str(&format!("  - {} [{:?}]\n", item.content, item.validation_status));
        }
    }
    out
}

pub fn describe_hypothesis(hypothesis: &Hypothesis) -> String {
    let mut out = format!("[{:?}] {}", hypothesis.status, hypothesis.belief);
    if !hypothesis.test.is_empty() {
        out.push_str(&format!(" (test: {})", hypothesis.test));
    }
    out
}
