//! Collection names.

use serde::{Deserialize, Serialize};
use signal_model::EntityKind;
use std::fmt;

/// Every collection the workspace reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    FocusAreas,
    Archetypes,
    Hypotheses,
    Ideas,
    JourneyMaps,
    Decisions,
    Objectives,
    Documents,
    Changelog,
    Blockers,
    InterviewNotes,
    Vision,
    StrategicContext,
    CompanyContext,
    Users,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FocusAreas => "focusAreas",
            Self::Archetypes => "archetypes",
            Self::Hypotheses => "hypotheses",
            Self::Ideas => "ideas",
            Self::JourneyMaps => "journeyMaps",
            Self::Decisions => "decisions",
            Self::Objectives => "objectives",
            Self::Documents => "documents",
            Self::Changelog => "changelog",
            Self::Blockers => "blockers",
            Self::InterviewNotes => "interviewNotes",
            Self::Vision => "vision",
            Self::StrategicContext => "strategicContext",
            Self::CompanyContext => "companyContext",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EntityKind> for Collection {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::FocusArea => Self::FocusAreas,
            EntityKind::Archetype => Self::Archetypes,
            EntityKind::Hypothesis => Self::Hypotheses,
            EntityKind::Idea => Self::Ideas,
            EntityKind::JourneyMap => Self::JourneyMaps,
            EntityKind::Decision => Self::Decisions,
            EntityKind::Objective => Self::Objectives,
            EntityKind::Document => Self::Documents,
            EntityKind::Changelog => Self::Changelog,
            EntityKind::Blocker => Self::Blockers,
        }
    }
}
