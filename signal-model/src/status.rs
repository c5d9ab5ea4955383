//! Status and classification enums.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Lifecycle of a focus area. Archiving is the soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum FocusAreaStatus {
    #[default]
    Active,
    Archived,
}

/// How sure the team is about a focus area's problem statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Lifecycle of a customer archetype. Archiving is the soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeStatus {
    #[default]
    Draft,
    Active,
    Validated,
    Archived,
}

/// Validation state of an assumption listed on an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Hypothesis,
    PartiallyValidated,
    Validated,
    Invalidated,
}

/// Lifecycle of a standalone hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum HypothesisStatus {
    #[default]
    Draft,
    Active,
    Validated,
    Invalidated,
    Parked,
}

/// Qualitative rating of a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStrength {
    #[default]
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    #[default]
    Backlog,
    Exploring,
    Committed,
    Shipped,
    Rejected,
}

/// Job-to-be-done dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    Functional,
    Emotional,
    Social,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    #[default]
    Product,
    Strategy,
    Technical,
    Design,
    Process,
}

/// Decision lifecycle. A proposed decision is still undecided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    #[default]
    Proposed,
    Decided,
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum KeyResultStatus {
    #[default]
    OnTrack,
    AtRisk,
    OffTrack,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    #[default]
    Feature,
    Improvement,
    Fix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum BlockerStatus {
    #[default]
    Open,
    Resolved,
}

impl HypothesisStatus {
    /// Whether this status records a test outcome.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Validated | Self::Invalidated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_status_wire_names() {
        let json = serde_json::to_string(&ValidationStatus::PartiallyValidated).unwrap();
        assert_eq!(json, "\"partially_validated\"");
        let parsed: ValidationStatus = serde_json::from_str("\"invalidated\"").unwrap();
        assert_eq!(parsed, ValidationStatus::Invalidated);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(HypothesisStatus::default(), HypothesisStatus::Draft);
        assert_eq!(DecisionStatus::default(), DecisionStatus::Proposed);
        assert_eq!(KeyResultStatus::default(), KeyResultStatus::OnTrack);
    }

    #[test]
    fn test_resolved_statuses() {
        assert!(HypothesisStatus::Validated.is_resolved());
        assert!(HypothesisStatus::Invalidated.is_resolved());
        assert!(!HypothesisStatus::Parked.is_resolved());
    }
}
