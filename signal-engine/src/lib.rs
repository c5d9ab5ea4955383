//! Signal Relationship & Alignment Engine
//!
//! Pure, synchronous computations over a loaded [`Workspace`] snapshot:
//! - Related-entity queries, one per entity kind, sharing one
//!   resolve-or-drop contract for soft links
//! - Aggregate metrics per focus area and per archetype
//! - Workspace-wide alignment warnings
//! - Archetype confidence and readiness scores
//! - Decision synthesis for resolved hypotheses
//!
//! Nothing here performs I/O. Identical snapshots always produce identical
//! output.
//!
//! [`Workspace`]: signal_model::Workspace

pub mod alignment;
pub mod decisions;
pub mod health;
pub mod metrics;
pub mod relationships;
pub mod resolve;
pub mod scoring;

pub use alignment::{alignment_warnings, AlignmentRule, AlignmentWarning, Severity};
pub use decisions::synthesize_decision;
pub use health::{workspace_health, WorkspaceHealth};
pub use metrics::{
    archetype_metrics, focus_area_metrics, objective_progress, percentage, validation_rate,
    ArchetypeMetrics, FocusAreaMetrics, HypothesisCounts,
};
pub use relationships::{related, RelatedEntity};
pub use scoring::{
    confidence_score, readiness_score, refresh_scores, score_archetype, ArchetypeScores,
    DEFAULT_INTERVIEW_TARGET,
};
