//! Workspace records.
//!
//! All link fields are soft links. A missing or empty field means "no link".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::{Entity, EntityKind};
use crate::status::*;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Attribution and timestamps carried by every record.
///
/// Timestamps are assigned by the store on create and on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr, $label:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn label(&self) -> &str {
                &self.$label
            }
        }
    };
}

// =============================================================================
// Strategy
// =============================================================================

/// A strategic problem the team has chosen to invest in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub status: FocusAreaStatus,
    #[serde(default)]
    pub target_archetype_ids: Vec<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl FocusArea {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FocusAreaStatus::Active
    }
}

impl_entity!(FocusArea, EntityKind::FocusArea, title);

/// An OKR objective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub quarter: String,
    #[serde(default)]
    pub status: ObjectiveStatus,
    #[serde(default)]
    pub key_results: Vec<KeyResult>,
    #[serde(default)]
    pub focus_area_ids: Vec<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Objective {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ObjectiveStatus::Active
    }
}

impl_entity!(Objective, EntityKind::Objective, title);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct KeyResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub status: KeyResultStatus,
}

// =============================================================================
// Customers
// =============================================================================

/// One assumption on an archetype, e.g. a pain point, with its validation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AssumptionItem {
    pub content: String,
    #[serde(default)]
    pub validation_status: ValidationStatus,
}

impl AssumptionItem {
    pub fn new(content: impl Into<String>, validation_status: ValidationStatus) -> Self {
        Self {
            content: content.into(),
            validation_status,
        }
    }
}

/// A modeled customer or stakeholder segment.
///
/// `confidence_score` and `readiness_score` are caches of values derived from
/// the assumption lists and the archetype's interview notes. The engine's
/// scoring functions are the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CustomerArchetype {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stakeholder_role: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub status: ArchetypeStatus,
    #[serde(default)]
    pub confidence_score: u32,
    #[serde(default)]
    pub readiness_score: u32,
    /// Interviews needed before the archetype counts as ready (default 8).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_target: Option<u32>,
    #[serde(default)]
    pub pain_points: Vec<AssumptionItem>,
    #[serde(default)]
    pub solutions: Vec<AssumptionItem>,
    #[serde(default)]
    pub goals: Vec<AssumptionItem>,
    #[serde(default)]
    pub metrics: Vec<AssumptionItem>,
    #[serde(default)]
    pub buying_criteria: Vec<AssumptionItem>,
    #[serde(default)]
    pub objections: Vec<AssumptionItem>,
    #[serde(default)]
    pub related_focus_area_ids: Vec<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl CustomerArchetype {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Archived archetypes are soft-deleted; every other status is live.
    pub fn is_active(&self) -> bool {
        self.status != ArchetypeStatus::Archived
    }

    /// All six assumption lists, in display order.
    pub fn assumption_lists(&self) -> [(&'static str, &[AssumptionItem]); 6] {
        [
            ("painPoints", &self.pain_points),
            ("solutions", &self.solutions),
            ("goals", &self.goals),
            ("metrics", &self.metrics),
            ("buyingCriteria", &self.buying_criteria),
            ("objections", &self.objections),
        ]
    }

    /// Every assumption across the six lists.
    pub fn assumptions(&self) -> impl Iterator<Item = &AssumptionItem> {
        self.pain_points
            .iter()
            .chain(&self.solutions)
            .chain(&self.goals)
            .chain(&self.metrics)
            .chain(&self.buying_criteria)
            .chain(&self.objections)
    }
}

impl_entity!(CustomerArchetype, EntityKind::Archetype, name);

/// Notes from one customer interview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct InterviewNote {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_id: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

// =============================================================================
// Discovery
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub description: String,
    #[serde(default)]
    pub strength: EvidenceStrength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A testable belief about a customer or market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub id: String,
    pub belief: String,
    #[serde(default)]
    pub test: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub status: HypothesisStatus,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_evidence_strength: Option<EvidenceStrength>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_id: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Hypothesis {
    pub fn new(id: impl Into<String>, belief: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            belief: belief.into(),
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == HypothesisStatus::Active
    }
}

impl_entity!(Hypothesis, EntityKind::Hypothesis, belief);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct JobToBeDone {
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub circumstance: String,
    #[serde(default, rename = "type")]
    pub job_type: JobType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_to_be_done: Option<JobToBeDone>,
    #[serde(default)]
    pub status: IdeaStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_archetype_id: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Idea {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

impl_entity!(Idea, EntityKind::Idea, title);

/// One step of a journey map. Experience ratings run from 1 to 5.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct JourneyStep {
    #[serde(default)]
    pub order: u32,
    pub title: String,
    #[serde(default)]
    pub timeline_day: i32,
    #[serde(default)]
    pub negative_experience: u8,
    #[serde(default)]
    pub positive_experience: u8,
    #[serde(default)]
    pub pain_point_note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct JourneyMap {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub steps: Vec<JourneyStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_id: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl JourneyMap {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

impl_entity!(JourneyMap, EntityKind::JourneyMap, title);

// =============================================================================
// Decisions and delivery
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct DecisionOption {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub category: DecisionCategory,
    #[serde(default)]
    pub status: DecisionStatus,
    #[serde(default)]
    pub options: Vec<DecisionOption>,
    #[serde(default)]
    pub rationale: String,
    /// Set on decisions synthesized from a hypothesis status change.
    #[serde(default)]
    pub auto_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_id: Option<String>,
    #[serde(default)]
    pub related_hypothesis_ids: Vec<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Decision {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

impl_entity!(Decision, EntityKind::Decision, title);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub archetype_ids: Vec<String>,
    #[serde(default)]
    pub focus_area_ids: Vec<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Document {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl_entity!(Document, EntityKind::Document, name);

/// A shipped change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    pub id: String,
    pub title: String,
    #[serde(default, rename = "type")]
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_id: Option<String>,
    #[serde(default)]
    pub validated_hypothesis_ids: Vec<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl ChangelogEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

impl_entity!(ChangelogEntry, EntityKind::Changelog, title);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Blocker {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: BlockerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area_id: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Blocker {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

impl_entity!(Blocker, EntityKind::Blocker, title);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_focus_area_reads_camel_case_document() {
        let doc = json!({
            "id": "fa-1",
            "title": "Onboarding drop-off",
            "problemStatement": "New teams stall in week one",
            "confidenceLevel": "medium",
            "targetArchetypeIds": ["ar-1"],
            "createdBy": "user-1",
            "createdAt": "2024-03-01T10:00:00Z"
        });

        let focus: FocusArea = serde_json::from_value(doc).unwrap();
        assert_eq!(focus.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(focus.status, FocusAreaStatus::Active);
        assert_eq!(focus.target_archetype_ids, vec!["ar-1".to_string()]);
        assert_eq!(focus.meta.created_by.as_deref(), Some("user-1"));
        assert!(focus.meta.created_at.is_some());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let hypothesis: Hypothesis =
            serde_json::from_value(json!({ "id": "h-1", "belief": "Teams want templates" }))
                .unwrap();
        assert_eq!(hypothesis.status, HypothesisStatus::Draft);
        assert!(hypothesis.focus_area_id.is_none());
        assert!(hypothesis.evidence.is_empty());
    }

    #[test]
    fn test_type_fields_use_wire_name() {
        let entry = ChangelogEntry {
            change_type: ChangeType::Fix,
            ..ChangelogEntry::new("c-1", "Fix export")
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "fix");
    }

    #[test]
    fn test_archetype_assumptions_cover_all_lists() {
        let archetype = CustomerArchetype {
            pain_points: vec![AssumptionItem::new("slow", ValidationStatus::Validated)],
            objections: vec![AssumptionItem::new("price", ValidationStatus::Hypothesis)],
            ..CustomerArchetype::new("ar-1", "Ops lead")
        };
        assert_eq!(archetype.assumptions().count(), 2);
        assert_eq!(archetype.assumption_lists().len(), 6);
        assert!(archetype.is_active());
    }
}
