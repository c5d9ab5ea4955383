//! Workspace health summary for the dashboard.

use serde::{Deserialize, Serialize};

use signal_model::{BlockerStatus, Workspace};

use crate::alignment::{alignment_warnings, AlignmentWarning};
use crate::metrics::HypothesisCounts;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceHealth {
    pub active_focus_areas: usize,
    pub active_archetypes: usize,
    pub active_objectives: usize,
    pub hypotheses: HypothesisCounts,
    pub validation_rate: u32,
    pub open_blockers: usize,
    pub warnings: Vec<AlignmentWarning>,
}

pub fn workspace_health(ws: &Workspace) -> WorkspaceHealth {
    let hypotheses = HypothesisCounts::tally(&ws.hypotheses);

    WorkspaceHealth {
        active_focus_areas: ws.focus_areas.iter().filter(|f| f.is_active()).count(),
        active_archetypes: ws.archetypes.iter().filter(|a| a.is_active()).count(),
        active_objectives: ws.objectives.iter().filter(|o| o.is_active()).count(),
        validation_rate: hypotheses.validation_rate(),
        hypotheses,
        open_blockers: ws
            .blockers
            .iter()
            .filter(|b| b.status == BlockerStatus::Open)
            .count(),
        warnings: alignment_warnings(ws),
    }
}
