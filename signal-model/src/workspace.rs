//! In-memory snapshot of every workspace collection.

use serde::{Deserialize, Serialize};

use crate::entities::*;

/// Fully loaded entity collections.
///
/// The engine computes all derived views from one snapshot and performs no
/// I/O of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
    #[serde(default)]
    pub archetypes: Vec<CustomerArchetype>,
    #[serde(default)]
    pub hypotheses: Vec<Hypothesis>,
    #[serde(default)]
    pub ideas: Vec<Idea>,
    #[serde(default)]
    pub journey_maps: Vec<JourneyMap>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    #[serde(default)]
    pub interview_notes: Vec<InterviewNote>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_area(&self, id: &str) -> Option<&FocusArea> {
        self.focus_areas.iter().find(|f| f.id == id)
    }

    pub fn archetype(&self, id: &str) -> Option<&CustomerArchetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    pub fn hypothesis(&self, id: &str) -> Option<&Hypothesis> {
        self.hypotheses.iter().find(|h| h.id == id)
    }

    /// Number of interview notes recorded against an archetype.
    pub fn interview_count(&self, archetype_id: &str) -> usize {
        self.interview_notes
            .iter()
            .filter(|n| n.archetype_id.as_deref() == Some(archetype_id))
            .count()
    }
}
