//! EnrichmentService - main entry point for enrichment operations.
//!
//! Every operation runs the same pipeline: authorize, validate the payload,
//! read optional context, make one bounded model call, extract the structured
//! reply. Invalid requests never reach the model.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use signal_model::{UserRole, VisionRecord};
use signal_store::DocumentStore;

use crate::auth::{AuthGate, Caller, TokenVerifier};
use crate::backend::{CompletionRequest, LlmBackend, Usage};
use crate::context::ContextReader;
use crate::error::GatewayError;
use crate::extraction::extract;
use crate::kind::{EnrichmentKind, Weight};
use crate::payload::*;
use crate::prompt::{
    describe_archetype, describe_focus_area, describe_hypothesis, system_prompt, PromptBuilder,
};
use crate::research::WebResearcher;
use crate::result::*;
use crate::speech::SpeechToText;
use crate::usage::{UsageEntry, UsageLog, DEFAULT_USAGE_CAPACITY};

/// Configuration for the EnrichmentService.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Timeout for short text operations
    pub light_timeout: Duration,
    /// Timeout for journey maps, synthesis, analysis and suggestions
    pub heavy_timeout: Duration,
    /// Timeout for audio transcription
    pub transcription_timeout: Duration,
    /// Tool-use rounds allowed during web research
    pub research_max_iterations: u32,
    /// Wall-clock bound on web research
    pub research_timeout: Duration,
    /// Sampling temperature for enrichment calls
    pub temperature: f32,
    /// Entries kept in the usage log
    pub usage_log_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            light_timeout: Duration::from_secs(120),
            heavy_timeout: Duration::from_secs(300),
            transcription_timeout: Duration::from_secs(540),
            research_max_iterations: 4,
            research_timeout: Duration::from_secs(90),
            temperature: 0.7,
            usage_log_capacity: DEFAULT_USAGE_CAPACITY,
        }
    }
}

impl GatewayConfig {
    pub fn timeout_for(&self, kind: EnrichmentKind) -> Duration {
        match kind.weight() {
            Weight::Light => self.light_timeout,
            Weight::Heavy => self.heavy_timeout,
            Weight::Audio => self.transcription_timeout,
        }
    }
}

/// Main entry point for enrichment operations.
pub struct EnrichmentService {
    config: GatewayConfig,
    backend: Arc<dyn LlmBackend>,
    transcriber: Arc<dyn SpeechToText>,
    pub(crate) store: Arc<dyn DocumentStore>,
    gate: AuthGate,
    pub(crate) context: ContextReader,
    usage: UsageLog,
}

impl EnrichmentService {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        transcriber: Arc<dyn SpeechToText>,
        store: Arc<dyn DocumentStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let config = GatewayConfig::default();
        Self {
            usage: UsageLog::with_max_entries(config.usage_log_capacity),
            config,
            backend,
            transcriber,
            gate: AuthGate::new(verifier, store.clone()),
            context: ContextReader::new(store.clone()),
            store,
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.usage = UsageLog::with_max_entries(config.usage_log_capacity);
        self.config = config;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn usage_log(&self) -> &UsageLog {
        &self.usage
    }

    pub async fn backend_available(&self) -> bool {
        self.backend.is_available().await
    }

    /// Authorize a caller allowed to run enrichment and workflow operations.
    pub async fn authorize(&self, token: Option<&str>) -> Result<Caller, GatewayError> {
        self.gate.require(token, UserRole::EDITORS).await
    }

    /// Authorize a caller for any of `roles`.
    pub async fn authorize_roles(
        &self,
        token: Option<&str>,
        roles: &[UserRole],
    ) -> Result<Caller, GatewayError> {
        self.gate.require(token, roles).await
    }

    /// Run an operation from a raw JSON payload and record it in the usage log.
    pub async fn invoke(
        &self,
        kind: EnrichmentKind,
        token: Option<&str>,
        payload: Value,
    ) -> Result<Value, GatewayError> {
        let started_at = Utc::now();

        let (caller_id, result) = match self.authorize(token).await {
            Ok(caller) => {
                debug!(%kind, user_id = %caller.user_id, "Processing enrichment");
                let result = self.dispatch(kind, &caller, payload).await;
                (Some(caller.user_id), result)
            }
            Err(e) => (None, Err(e)),
        };

        let entry = UsageEntry::new(kind.as_str(), started_at).with_caller(caller_id);
        match result {
            Ok((value, usage)) => {
                info!(
                    %kind,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "Enrichment complete"
                );
                self.usage.record(entry.succeeded(usage)).await;
                Ok(value)
            }
            Err(e) => {
                debug!(%kind, error = %e, "Enrichment failed");
                self.usage.record(entry.failed(e.kind())).await;
                Err(e)
            }
        }
    }

    async fn dispatch(
        &self,
        kind: EnrichmentKind,
        caller: &Caller,
        payload: Value,
    ) -> Result<(Value, TokenUsage), GatewayError> {
        match kind {
            EnrichmentKind::GenerateVision => {
                wire(self.generate_vision(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::RewriteProblemStatement => {
                wire(self.rewrite_problem_statement(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::EnrichStrategicContext => {
                wire(self.enrich_strategic_context(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::EnrichCompanyContext => {
                wire(self.enrich_company_context(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::GenerateJourneyMap => {
                wire(self.generate_journey_map(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::DetectJourneyMap => {
                wire(self.detect_journey_map(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::CritiqueArchetypeInput => {
                wire(self.critique_archetype_input(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::ExtractArchetypeAssumptions => {
                wire(self.extract_archetype_assumptions(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::GenerateInterviewQuestions => {
                wire(self.generate_interview_questions(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::SynthesizeInterview => {
                wire(self.synthesize_interview(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::AnalyzeTranscript => {
                wire(self.analyze_transcript(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::SuggestHypotheses => {
                wire(self.suggest_hypotheses(caller, parse_payload(payload)?).await?)
            }
            EnrichmentKind::TranscribeAudio => {
                wire(self.transcribe_audio(caller, parse_payload(payload)?).await?)
            }
        }
    }

    /// One bounded model call, extracted into `T`.
    async fn complete<T: DeserializeOwned>(
        &self,
        kind: EnrichmentKind,
        prompt: String,
    ) -> Result<(T, Usage), GatewayError> {
        let request = CompletionRequest::user(prompt)
            .with_system(system_prompt(kind))
            .with_max_tokens(kind.max_tokens())
            .with_temperature(self.config.temperature);

        let timeout = self.config.timeout_for(kind);
        let response = match tokio::time::timeout(timeout, self.backend.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(%kind, error = %e, "Model call failed");
                return Err(GatewayError::Internal(format!(
                    "Failed to {}: {}",
                    kind.action(),
                    e
                )));
            }
            Err(_) => {
                error!(%kind, timeout_secs = timeout.as_secs(), "Model call timed out");
                return Err(GatewayError::Internal(format!(
                    "Timed out after {}s trying to {}",
                    timeout.as_secs(),
                    kind.action()
                )));
            }
        };

        match extract::<T>(&response.content, kind.reply_shape()) {
            Some(value) => Ok((value, response.usage)),
            None => {
                warn!(%kind, raw = %response.content, "Could not extract model reply");
                Err(GatewayError::FailedToParse(kind.parse_subject().to_string()))
            }
        }
    }

    pub async fn generate_vision(
        &self,
        _caller: &Caller,
        payload: GenerateVisionPayload,
    ) -> Result<Enriched<Suggestions>, GatewayError> {
        let (vision, focus_areas) =
            futures::join!(self.context.vision(), self.context.active_focus_areas());
        let vision = vision.unwrap_or_default();

        let current = optional(&payload.current_vision)
            .map(str::to_string)
            .or_else(|| Some(vision.statement.clone()));
        let prompt = PromptBuilder::new()
            .optional_section("Current vision", current)
            .optional_section("Mission", Some(&vision.mission))
            .optional_section("Company context", optional(&payload.company_context))
            .list_section("Active focus areas", focus_areas.iter().map(describe_focus_area))
            .instruction(
                "Suggest three alternative vision statements. Each should be one sentence, \
                 aspirational but specific to this company and its focus areas.",
                r#"{"suggestions": ["...", "...", "..."]}"#,
            )
            .build();

        let (result, usage) = self
            .complete::<Suggestions>(EnrichmentKind::GenerateVision, prompt)
            .await?;
        Ok(Enriched::new(result, usage))
    }

    pub async fn rewrite_problem_statement(
        &self,
        _caller: &Caller,
        payload: RewriteProblemStatementPayload,
    ) -> Result<Enriched<Suggestions>, GatewayError> {
        let statement = required(&payload.problem_statement, "problemStatement")?;
        let company = self.context.company_context().await;

        let prompt = PromptBuilder::new()
            .optional_section("Company context", company.map(|c| c.describe()))
            .optional_section("Focus area", optional(&payload.title))
            .section("Problem statement", statement)
            .instruction(
                "Rewrite the problem statement three ways. Each rewrite names who has the \
                 problem, what they struggle with and the impact, without proposing a solution.",
                r#"{"suggestions": ["...", "...", "..."]}"#,
            )
            .build();

        let (result, usage) = self
            .complete::<Suggestions>(EnrichmentKind::RewriteProblemStatement, prompt)
            .await?;
        Ok(Enriched::new(result, usage))
    }

    pub async fn enrich_strategic_context(
        &self,
        _caller: &Caller,
        payload: EnrichStrategicContextPayload,
    ) -> Result<Enriched<StrategicContextEnrichment>, GatewayError> {
        let section = payload.section()?;
        let record = self.context.strategic_context().await.unwrap_or_default();

        let current = optional(&payload.current_content)
            .map(str::to_string)
            .or_else(|| record.sections.get(section.as_str()).cloned());
        let other_sections: Vec<String> = record
            .sections
            .iter()
            .filter(|(name, body)| name.as_str() != section.as_str() && !body.trim().is_empty())
            .map(|(name, body)| format!("{}: {}", name, body.trim()))
            .collect();

        let prompt = PromptBuilder::new()
            .optional_section("Company context", optional(&payload.company_context))
            .list_section("Other strategy sections", other_sections)
            .optional_section(&format!("Current {}", section.title()), current)
            .instruction(
                &format!(
                    "Write an improved {} section for the strategy document, then list up \
                     to three further suggestions the team could consider.",
                    section.title().to_lowercase()
                ),
                r#"{"content": "...", "suggestions": ["..."]}"#,
            )
            .build();

        let (result, usage) = self
            .complete::<StrategicContextEnrichment>(EnrichmentKind::EnrichStrategicContext, prompt)
            .await?;
        Ok(Enriched::new(result, usage))
    }

    pub async fn enrich_company_context(
        &self,
        _caller: &Caller,
        payload: EnrichCompanyContextPayload,
    ) -> Result<Enriched<CompanyContextResult>, GatewayError> {
        let company_name = required(&payload.company_name, "companyName")?;
        let existing = self.context.company_context().await;

        let prompt = PromptBuilder::new()
            .section("Company", company_name)
            .optional_section("Industry", optional(&payload.industry))
            .optional_section("Description", optional(&payload.description))
            .optional_section("Existing context", existing.map(|c| c.describe()))
            .instruction(
                "Draft a company context profile. Keep the summary to two or three \
                 sentences and list the main competitors by name.",
                r#"{"companyName": "...", "industry": "...", "summary": "...", "targetMarket": "...", "businessModel": "...", "competitors": ["..."]}"#,
            )
            .build();

        let (mut draft, usage) = self
            .complete::<CompanyContextDraft>(EnrichmentKind::EnrichCompanyContext, prompt)
            .await?;
        if draft.company_name.trim().is_empty() {
            draft.company_name = company_name.to_string();
        }
        Ok(Enriched::new(
            CompanyContextResult {
                company_context: draft,
            },
            usage,
        ))
    }

    pub async fn generate_journey_map(
        &self,
        _caller: &Caller,
        payload: GenerateJourneyMapPayload,
    ) -> Result<Enriched<JourneyMapResult>, GatewayError> {
        let archetype_id = required(&payload.archetype_id, "archetypeId")?;
        let archetype = self.context.archetype("archetypeId", archetype_id).await?;
        let idea = self.context.idea_opt(optional(&payload.idea_id)).await;

        let prompt = PromptBuilder::new()
            .section("Archetype", describe_archetype(&archetype))
            .optional_section("Idea", idea.map(|i| i.title))
            .optional_section("Scenario", optional(&payload.scenario))
            .instruction(
                "Map this archetype's journey as 5 to 10 ordered steps. Rate each step's \
                 negative and positive experience from 1 to 5 and note the main pain point.",
                r#"{"title": "...", "steps": [{"order": 1, "title": "...", "timelineDay": 0, "negativeExperience": 1, "positiveExperience": 1, "painPointNote": "..."}]}"#,
            )
            .build();

        let (draft, usage) = self
            .complete::<JourneyMapDraft>(EnrichmentKind::GenerateJourneyMap, prompt)
            .await?;
        Ok(Enriched::new(
            JourneyMapResult {
                journey_map: draft.normalized(),
            },
            usage,
        ))
    }

    pub async fn detect_journey_map(
        &self,
        _caller: &Caller,
        payload: DetectJourneyMapPayload,
    ) -> Result<Enriched<DetectedJourneyMap>, GatewayError> {
        let transcript = required(&payload.transcript, "transcript")?;
        let archetype = self
            .context
            .archetype_opt(optional(&payload.archetype_id))
            .await;

        let prompt = PromptBuilder::new()
            .optional_section("Archetype", archetype.as_ref().map(describe_archetype))
            .section("Transcript", transcript)
            .instruction(
                "Decide whether the transcript describes a customer journey with a clear \
                 sequence of steps. If it does, extract it as a journey map; otherwise \
                 set detected to false and omit journeyMap.",
                r#"{"detected": true, "journeyMap": {"title": "...", "steps": [{"order": 1, "title": "...", "timelineDay": 0, "negativeExperience": 1, "positiveExperience": 1, "painPointNote": "..."}]}}"#,
            )
            .build();

        let (mut detection, usage) = self
            .complete::<DetectedJourneyMap>(EnrichmentKind::DetectJourneyMap, prompt)
            .await?;
        detection.journey_map = if detection.detected {
            detection.journey_map.map(JourneyMapDraft::normalized)
        } else {
            None
        };
        Ok(Enriched::new(detection, usage))
    }

    pub async fn critique_archetype_input(
        &self,
        _caller: &Caller,
        payload: CritiqueArchetypeInputPayload,
    ) -> Result<Enriched<CritiqueResult>, GatewayError> {
        let field = required(&payload.field, "field")?;
        let content = required(&payload.content, "content")?;

        let prompt = PromptBuilder::new()
            .optional_section("Archetype", optional(&payload.archetype_name))
            .section("Field", field)
            .section("Content", content)
            .instruction(
                "Critique this archetype input for specificity and testability. Score it \
                 from 1 to 10 and list strengths, weaknesses and concrete suggestions.",
                r#"{"score": 7, "strengths": ["..."], "weaknesses": ["..."], "suggestions": ["..."]}"#,
            )
            .build();

        let (mut critique, usage) = self
            .complete::<Critique>(EnrichmentKind::CritiqueArchetypeInput, prompt)
            .await?;
        critique.score = critique.score.clamp(1, 10);
        Ok(Enriched::new(CritiqueResult { critique }, usage))
    }

    pub async fn extract_archetype_assumptions(
        &self,
        _caller: &Caller,
        payload: ExtractArchetypeAssumptionsPayload,
    ) -> Result<Enriched<AssumptionResult>, GatewayError> {
        let description = required(&payload.description, "description")?;

        let prompt = PromptBuilder::new()
            .optional_section("Archetype", optional(&payload.archetype_name))
            .section("Description", description)
            .instruction(
                "Extract the testable assumptions in this description, grouped as pain \
                 points, solutions, goals, metrics, buying criteria and objections. Each \
                 assumption is one short statement.",
                r#"{"painPoints": ["..."], "solutions": ["..."], "goals": ["..."], "metrics": ["..."], "buyingCriteria": ["..."], "objections": ["..."]}"#,
            )
            .build();

        let (assumptions, usage) = self
            .complete::<AssumptionDraft>(EnrichmentKind::ExtractArchetypeAssumptions, prompt)
            .await?;
        Ok(Enriched::new(AssumptionResult { assumptions }, usage))
    }

    pub async fn generate_interview_questions(
        &self,
        _caller: &Caller,
        payload: GenerateInterviewQuestionsPayload,
    ) -> Result<Enriched<InterviewQuestions>, GatewayError> {
        let archetype_id = required(&payload.archetype_id, "archetypeId")?;
        let count = payload.count()?;
        let archetype = self.context.archetype("archetypeId", archetype_id).await?;
        let hypotheses = self.context.hypotheses().await;

        let prompt = PromptBuilder::new()
            .section("Archetype", describe_archetype(&archetype))
            .list_section(
                "Open hypotheses",
                hypotheses
                    .iter()
                    .filter(|h| h.is_active() && h.archetype_id.as_deref() == Some(archetype_id))
                    .map(describe_hypothesis),
            )
            .instruction(
                &format!(
                    "Write {} interview questions for this archetype. Ask about past \
                     behaviour, not opinions. Tag each with a category and, where it \
                     tests one, the hypothesis it targets.",
                    count
                ),
                r#"[{"question": "...", "category": "...", "targetHypothesis": "..."}]"#,
            )
            .build();

        let (mut questions, usage) = self
            .complete::<Vec<InterviewQuestion>>(EnrichmentKind::GenerateInterviewQuestions, prompt)
            .await?;
        questions.truncate(count as usize);
        Ok(Enriched::new(InterviewQuestions { questions }, usage))
    }

    pub async fn synthesize_interview(
        &self,
        _caller: &Caller,
        payload: SynthesizeInterviewPayload,
    ) -> Result<Enriched<SynthesisResult>, GatewayError> {
        let notes = required(&payload.notes, "notes")?;
        let archetype = self
            .context
            .archetype_opt(optional(&payload.archetype_id))
            .await;

        let prompt = PromptBuilder::new()
            .optional_section("Archetype", archetype.as_ref().map(describe_archetype))
            .section("Interview notes", notes)
            .instruction(
                "Synthesize these interview notes: a short summary, the key insights, how \
                 the evidence bears on the archetype's assumptions, and verbatim quotes.",
                r#"{"summary": "...", "keyInsights": ["..."], "hypothesisUpdates": ["..."], "quotes": ["..."]}"#,
            )
            .build();

        let (synthesis, usage) = self
            .complete::<InterviewSynthesis>(EnrichmentKind::SynthesizeInterview, prompt)
            .await?;
        Ok(Enriched::new(SynthesisResult { synthesis }, usage))
    }

    pub async fn analyze_transcript(
        &self,
        _caller: &Caller,
        payload: AnalyzeTranscriptPayload,
    ) -> Result<Enriched<AnalysisResult>, GatewayError> {
        let transcript = required(&payload.transcript, "transcript")?;
        let archetype = self
            .context
            .archetype_opt(optional(&payload.archetype_id))
            .await;

        let prompt = PromptBuilder::new()
            .optional_section("Archetype", archetype.as_ref().map(describe_archetype))
            .section("Transcript", transcript)
            .instruction(
                "Analyze this interview transcript. Summarize it, list pain points, goals \
                 and objections, pick the most telling quotes and describe the overall \
                 sentiment in one word.",
                r#"{"summary": "...", "painPoints": ["..."], "goals": ["..."], "objections": ["..."], "quotes": ["..."], "sentiment": "..."}"#,
            )
            .build();

        let (analysis, usage) = self
            .complete::<TranscriptAnalysis>(EnrichmentKind::AnalyzeTranscript, prompt)
            .await?;
        Ok(Enriched::new(AnalysisResult { analysis }, usage))
    }

    pub async fn suggest_hypotheses(
        &self,
        _caller: &Caller,
        payload: SuggestHypothesesPayload,
    ) -> Result<Enriched<HypothesisSuggestions>, GatewayError> {
        let focus_filter = optional(&payload.focus_area_id);
        let archetype_filter = optional(&payload.archetype_id);

        let (vision, focus_areas, archetypes, hypotheses) = futures::join!(
            self.context.vision(),
            self.context.active_focus_areas(),
            self.context.archetypes(),
            self.context.hypotheses(),
        );

        let focus_areas: Vec<_> = focus_areas
            .into_iter()
            .filter(|f| focus_filter.map_or(true, |id| f.id == id))
            .collect();
        let archetypes: Vec<_> = archetypes
            .into_iter()
            .filter(|a| archetype_filter.map_or(true, |id| a.id == id))
            .collect();
        let hypotheses: Vec<_> = hypotheses
            .into_iter()
            .filter(|h| focus_filter.map_or(true, |id| h.focus_area_id.as_deref() == Some(id)))
            .filter(|h| archetype_filter.map_or(true, |id| h.archetype_id.as_deref() == Some(id)))
            .collect();

        let mut context = PromptBuilder::new()
            .optional_section("Vision", vision.map(|v: VisionRecord| v.statement))
            .list_section("Focus areas", focus_areas.iter().map(describe_focus_area))
            .list_section(
                "Archetypes",
                archetypes
                    .iter()
                    .map(|a| format!("{} (id: {})", a.name, a.id)),
            )
            .list_section("Existing hypotheses", hypotheses.iter().map(describe_hypothesis))
            .build();

        if payload.web_search.unwrap_or(false) {
            let researcher = WebResearcher::new(
                self.backend.clone(),
                self.config.research_max_iterations,
                self.config.research_timeout,
            );
            if let Some(findings) = researcher.research(&context).await {
                context = PromptBuilder::new()
                    .section("Web research", findings)
                    .build()
                    + &context;
            }
        }

        let prompt = context
            + &PromptBuilder::new()
                .instruction(
                    "Suggest up to five new hypotheses that do not duplicate the existing \
                     ones. Each needs a falsifiable belief, a cheap test and a rationale. \
                     Link each to a focus area and archetype id from the context where one fits.",
                    r#"[{"belief": "...", "test": "...", "rationale": "...", "focusAreaId": "...", "archetypeId": "..."}]"#,
                )
                .build();

        let (suggestions, usage) = self
            .complete::<Vec<HypothesisSuggestion>>(EnrichmentKind::SuggestHypotheses, prompt)
            .await?;

        // Links must point at records the model was shown
        let known_focus: HashSet<&str> = focus_areas.iter().map(|f| f.id.as_str()).collect();
        let known_archetypes: HashSet<&str> = archetypes.iter().map(|a| a.id.as_str()).collect();
        let suggestions = suggestions
            .into_iter()
            .map(|mut s| {
                s.focus_area_id = s
                    .focus_area_id
                    .filter(|id| known_focus.contains(id.as_str()))
                    .or_else(|| focus_filter.map(str::to_string));
                s.archetype_id = s
                    .archetype_id
                    .filter(|id| known_archetypes.contains(id.as_str()))
                    .or_else(|| archetype_filter.map(str::to_string));
                s
            })
            .collect();

        Ok(Enriched::new(HypothesisSuggestions { suggestions }, usage))
    }

    pub async fn transcribe_audio(
        &self,
        _caller: &Caller,
        payload: TranscribeAudioPayload,
    ) -> Result<Enriched<TranscriptResult>, GatewayError> {
        let kind = EnrichmentKind::TranscribeAudio;
        let mime_type = payload.mime_type()?;
        let audio = payload.audio()?;
        debug!(bytes = audio.len(), %mime_type, "Transcribing audio");

        let timeout = self.config.timeout_for(kind);
        let transcript =
            match tokio::time::timeout(timeout, self.transcriber.transcribe(audio, mime_type)).await
            {
                Ok(Ok(transcript)) => transcript,
                Ok(Err(e)) => {
                    error!(error = %e, "Transcription failed");
                    return Err(GatewayError::Internal(format!(
                        "Failed to {}: {}",
                        kind.action(),
                        e
                    )));
                }
                Err(_) => {
                    error!(timeout_secs = timeout.as_secs(), "Transcription timed out");
                    return Err(GatewayError::Internal(format!(
                        "Timed out after {}s trying to {}",
                        timeout.as_secs(),
                        kind.action()
                    )));
                }
            };

        // The speech API does not meter tokens
        Ok(Enriched::new(TranscriptResult { transcript }, Usage::default()))
    }
}

fn wire<T: Serialize>(enriched: Enriched<T>) -> Result<(Value, TokenUsage), GatewayError> {
    let usage = enriched.usage;
    let value = serde_json::to_value(&enriched)
        .map_err(|e| GatewayError::Internal(format!("Failed to encode result: {}", e)))?;
    Ok((value, usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtVerifier;
    use crate::backend::MockBackend;
    use crate::speech::MockTranscriber;
    use serde_json::json;
    use signal_model::UserProfile;
    use signal_store::{add_record, Collection, MemoryStore};

    async fn service(backend: Arc<MockBackend>) -> (EnrichmentService, String) {
        let store = Arc::new(MemoryStore::new());
        add_record(
            store.as_ref(),
            Collection::Users,
            &UserProfile {
                id: "u-1".into(),
                display_name: "Pat".into(),
                email: "pat@example.com".into(),
                role: UserRole::ProductManager,
            },
        )
        .await
        .unwrap();

        let verifier = JwtVerifier::new_dev();
        let token = verifier.issue("u-1").unwrap();
        let service = EnrichmentService::new(
            backend,
            Arc::new(MockTranscriber::default()),
            store,
            Arc::new(verifier),
        );
        (service, token)
    }

    #[test]
    fn test_timeouts_by_weight() {
        let config = GatewayConfig::default();
        assert_eq!(config.timeout_for(EnrichmentKind::GenerateVision).as_secs(), 120);
        assert_eq!(config.timeout_for(EnrichmentKind::GenerateJourneyMap).as_secs(), 300);
        assert_eq!(config.timeout_for(EnrichmentKind::SuggestHypotheses).as_secs(), 300);
        assert_eq!(config.timeout_for(EnrichmentKind::TranscribeAudio).as_secs(), 540);
    }

    #[tokio::test]
    async fn test_invoke_attaches_usage() {
        let backend = Arc::new(MockBackend::new("mock").with_usage(200, 50));
        backend
            .push_text("```json\n{\"suggestions\": [\"A\", \"B\"]}\n```")
            .await;
        let (service, token) = service(backend.clone()).await;

        let value = service
            .invoke(EnrichmentKind::GenerateVision, Some(&token), Value::Null)
            .await
            .unwrap();
        assert_eq!(
            value,
            json!({
                "suggestions": ["A", "B"],
                "usage": {"inputTokens": 200, "outputTokens": 50}
            })
        );

        let requests = backend.requests().await;
        assert_eq!(requests[0].max_tokens, Some(1024));
        assert!(requests[0].system_prompt.is_some());

        let recent = service.usage_log().recent(10).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, "generate-vision");
        assert_eq!(recent[0].caller_id.as_deref(), Some("u-1"));
        assert_eq!(recent[0].input_tokens, 200);
    }

    #[tokio::test]
    async fn test_model_failure_is_internal() {
        let backend = Arc::new(MockBackend::new("mock"));
        backend.push_failure("upstream 500").await;
        let (service, token) = service(backend).await;

        let err = service
            .invoke(
                EnrichmentKind::CritiqueArchetypeInput,
                Some(&token),
                json!({"field": "painPoints", "content": "Reporting is slow"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
        assert!(err.to_string().starts_with("Failed to critique archetype input"));
    }

    #[tokio::test]
    async fn test_questions_truncated_to_count() {
        let backend = Arc::new(MockBackend::new("mock"));
        let (service, token) = service(backend.clone()).await;
        add_record(
            service.store.as_ref(),
            Collection::Archetypes,
            &signal_model::CustomerArchetype::new("ar-1", "Ops lead"),
        )
        .await
        .unwrap();
        backend
            .push_text(
                r#"Here you go: [{"question": "Q1", "category": "workflow"},
                {"question": "Q2", "category": "pain"},
                {"question": "Q3", "category": "pain"}]"#,
            )
            .await;

        let value = service
            .invoke(
                EnrichmentKind::GenerateInterviewQuestions,
                Some(&token),
                json!({"archetypeId": "ar-1", "count": 2}),
            )
            .await
            .unwrap();
        assert_eq!(value["questions"].as_array().unwrap().len(), 2);
        assert_eq!(value["questions"][0]["question"], "Q1");
        assert!(value["questions"][0].get("targetHypothesis").is_none());
    }

    #[tokio::test]
    async fn test_suggestion_links_are_resolved() {
        let backend = Arc::new(MockBackend::new("mock"));
        let (service, _token) = service(backend.clone()).await;
        add_record(
            service.store.as_ref(),
            Collection::FocusAreas,
            &signal_model::FocusArea::new("fa-1", "Onboarding"),
        )
        .await
        .unwrap();
        backend
            .push_text(
                r#"[{"belief": "Teams want templates", "test": "Fake door", "rationale": "r",
                    "focusAreaId": "fa-1", "archetypeId": "ar-invented"}]"#,
            )
            .await;

        let result = service
            .suggest_hypotheses(
                &Caller {
                    user_id: "u-1".into(),
                    role: UserRole::ProductManager,
                },
                SuggestHypothesesPayload::default(),
            )
            .await
            .unwrap();
        let suggestion = &result.result.suggestions[0];
        assert_eq!(suggestion.focus_area_id.as_deref(), Some("fa-1"));
        assert!(suggestion.archetype_id.is_none());
        // Web research is off by default
        assert_eq!(backend.call_count(), 1);
    }
}
