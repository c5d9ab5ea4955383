//! Workspace-wide alignment warnings.
//!
//! Five independent rules, evaluated in a fixed order. Each yields at most one
//! warning, carrying a live count and the dashboard route to fix it from.

use serde::{Deserialize, Serialize};

use signal_model::{DecisionStatus, Entity, EntityKind, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentRule {
    FocusAreaWithoutArchetypes,
    ArchetypeWithoutFocusAreas,
    HypothesisWithoutArchetype,
    ObjectiveWithoutFocusAreas,
    DecisionWithoutHypotheses,
}

impl AlignmentRule {
    /// Evaluation and display order.
    pub const ALL: [AlignmentRule; 5] = [
        Self::FocusAreaWithoutArchetypes,
        Self::ArchetypeWithoutFocusAreas,
        Self::HypothesisWithoutArchetype,
        Self::ObjectiveWithoutFocusAreas,
        Self::DecisionWithoutHypotheses,
    ];

    pub fn severity(&self) -> Severity {
        match self {
            Self::FocusAreaWithoutArchetypes
            | Self::ArchetypeWithoutFocusAreas
            | Self::ObjectiveWithoutFocusAreas => Severity::Warning,
            Self::HypothesisWithoutArchetype | Self::DecisionWithoutHypotheses => Severity::Info,
        }
    }

    fn subject(&self) -> EntityKind {
        match self {
            Self::FocusAreaWithoutArchetypes => EntityKind::FocusArea,
            Self::ArchetypeWithoutFocusAreas => EntityKind::Archetype,
            Self::HypothesisWithoutArchetype => EntityKind::Hypothesis,
            Self::ObjectiveWithoutFocusAreas => EntityKind::Objective,
            Self::DecisionWithoutHypotheses => EntityKind::Decision,
        }
    }

    fn message(&self, count: usize) -> String {
        let one = count == 1;
        match self {
            Self::FocusAreaWithoutArchetypes => format!(
                "{} active focus {} no target archetypes",
                count,
                if one { "area has" } else { "areas have" }
            ),
            Self::ArchetypeWithoutFocusAreas => format!(
                "{} {} not linked to any focus area",
                count,
                if one { "archetype is" } else { "archetypes are" }
            ),
            Self::HypothesisWithoutArchetype => format!(
                "{} active {} no archetype",
                count,
                if one { "hypothesis has" } else { "hypotheses have" }
            ),
            Self::ObjectiveWithoutFocusAreas => format!(
                "{} active {} not linked to any focus area",
                count,
                if one { "objective is" } else { "objectives are" }
            ),
            Self::DecisionWithoutHypotheses => format!(
                "{} proposed {} no supporting hypotheses",
                count,
                if one { "decision has" } else { "decisions have" }
            ),
        }
    }

    /// Ids of the entities this rule flags.
    fn offenders(&self, ws: &Workspace) -> Vec<String> {
        fn ids<'a, T: Entity + 'a>(items: impl Iterator<Item = &'a T>) -> Vec<String> {
            items.map(|item| item.id().to_string()).collect()
        }

        match self {
            Self::FocusAreaWithoutArchetypes => ids(ws
                .focus_areas
                .iter()
                .filter(|f| f.is_active() && f.target_archetype_ids.is_empty())),
            Self::ArchetypeWithoutFocusAreas => ids(ws
                .archetypes
                .iter()
                .filter(|a| a.is_active() && a.related_focus_area_ids.is_empty())),
            Self::HypothesisWithoutArchetype => ids(ws
                .hypotheses
                .iter()
                .filter(|h| h.is_active() && h.archetype_id.as_deref().unwrap_or("").is_empty())),
            Self::ObjectiveWithoutFocusAreas => ids(ws
                .objectives
                .iter()
                .filter(|o| o.is_active() && o.focus_area_ids.is_empty())),
            Self::DecisionWithoutHypotheses => ids(ws.decisions.iter().filter(|d| {
                d.status == DecisionStatus::Proposed && d.related_hypothesis_ids.is_empty()
            })),
        }
    }

    /// Evaluate this rule against a snapshot.
    pub fn evaluate(&self, ws: &Workspace) -> Option<AlignmentWarning> {
        let entity_ids = self.offenders(ws);
        if entity_ids.is_empty() {
            return None;
        }

        Some(AlignmentWarning {
            rule: *self,
            severity: self.severity(),
            message: self.message(entity_ids.len()),
            target_path: self.subject().list_path().to_string(),
            count: entity_ids.len(),
            entity_ids,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentWarning {
    pub rule: AlignmentRule,
    pub severity: Severity,
    pub message: String,
    pub target_path: String,
    pub count: usize,
    pub entity_ids: Vec<String>,
}

/// All warnings for a snapshot, in rule order.
pub fn alignment_warnings(ws: &Workspace) -> Vec<AlignmentWarning> {
    AlignmentRule::ALL
        .iter()
        .filter_map(|rule| rule.evaluate(ws))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_model::*;

    fn misaligned_workspace() -> Workspace {
        let mut ws = Workspace::new();
        ws.focus_areas.push(FocusArea::new("fa-1", "Onboarding"));
        ws.focus_areas.push(FocusArea {
            status: FocusAreaStatus::Archived,
            ..FocusArea::new("fa-2", "Legacy")
        });
        ws.archetypes.push(CustomerArchetype::new("ar-1", "Admin"));
        ws.archetypes.push(CustomerArchetype::new("ar-2", "Champion"));
        ws.hypotheses.push(Hypothesis {
            status: HypothesisStatus::Active,
            ..Hypothesis::new("h-1", "Teams want templates")
        });
        ws.hypotheses.push(Hypothesis::new("h-2", "Draft idea"));
        ws.objectives.push(Objective::new("o-1", "Activation"));
        ws.decisions.push(Decision::new("d-1", "Pick a vendor"));
        ws.decisions.push(Decision {
            status: DecisionStatus::Decided,
            ..Decision::new("d-2", "Done")
        });
        ws
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let warnings = alignment_warnings(&misaligned_workspace());
        let rules: Vec<AlignmentRule> = warnings.iter().map(|w| w.rule).collect();
        assert_eq!(rules, AlignmentRule::ALL.to_vec());

        assert_eq!(warnings[0].message, "1 active focus area has no target archetypes");
        assert_eq!(warnings[0].target_path, "/focus-areas");
        assert_eq!(warnings[0].severity, Severity::Warning);

        assert_eq!(warnings[1].message, "2 archetypes are not linked to any focus area");
        assert_eq!(warnings[1].entity_ids, vec!["ar-1", "ar-2"]);

        assert_eq!(warnings[2].message, "1 active hypothesis has no archetype");
        assert_eq!(warnings[2].severity, Severity::Info);

        assert_eq!(warnings[3].target_path, "/objectives");
        assert_eq!(warnings[4].message, "1 proposed decision has no supporting hypotheses");
    }

    #[test]
    fn test_aligned_workspace_has_no_warnings() {
        let mut ws = Workspace::new();
        ws.focus_areas.push(FocusArea {
            target_archetype_ids: vec!["ar-1".into()],
            ..FocusArea::new("fa-1", "Onboarding")
        });
        ws.archetypes.push(CustomerArchetype {
            related_focus_area_ids: vec!["fa-1".into()],
            ..CustomerArchetype::new("ar-1", "Admin")
        });
        ws.archetypes.push(CustomerArchetype {
            status: ArchetypeStatus::Archived,
            ..CustomerArchetype::new("ar-2", "Old")
        });
        assert!(alignment_warnings(&ws).is_empty());
    }

    #[test]
    fn test_warnings_are_deterministic() {
        let ws = misaligned_workspace();
        assert_eq!(alignment_warnings(&ws), alignment_warnings(&ws));
    }
}
