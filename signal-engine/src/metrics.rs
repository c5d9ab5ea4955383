//! Aggregate metrics per focus area and per archetype.
//!
//! All percentages are integers rounded half away from zero. A ratio with an
//! empty denominator is 0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use signal_model::{
    BlockerStatus, ChangeType, Hypothesis, HypothesisStatus, KeyResult, Workspace,
};

use crate::resolve::{link_is, links_to, resolve, resolve_one};
use crate::scoring::{score_archetype, ArchetypeScores};

/// Rounded percentage of `part` in `whole`, 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

/// Validated share of resolved hypotheses.
pub fn validation_rate(validated: usize, invalidated: usize) -> u32 {
    percentage(validated, validated + invalidated)
}

/// Mean completion of key results with a positive target, each capped at 100.
pub fn objective_progress<'a>(key_results: impl IntoIterator<Item = &'a KeyResult>) -> u32 {
    let mut sum = 0.0;
    let mut counted = 0u32;
    for kr in key_results.into_iter().filter(|kr| kr.target > 0.0) {
        sum += (kr.current / kr.target * 100.0).clamp(0.0, 100.0);
        counted += 1;
    }
    if counted == 0 {
        return 0;
    }
    (sum / f64::from(counted)).round() as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisCounts {
    pub total: usize,
    pub validated: usize,
    pub invalidated: usize,
    pub active: usize,
}

impl HypothesisCounts {
    pub fn tally<'a>(hypotheses: impl IntoIterator<Item = &'a Hypothesis>) -> Self {
        let mut counts = Self::default();
        for h in hypotheses {
            counts.total += 1;
            match h.status {
                HypothesisStatus::Validated => counts.validated += 1,
                HypothesisStatus::Invalidated => counts.invalidated += 1,
                HypothesisStatus::Active => counts.active += 1,
                HypothesisStatus::Draft | HypothesisStatus::Parked => {}
            }
        }
        counts
    }

    pub fn validation_rate(&self) -> u32 {
        validation_rate(self.validated, self.invalidated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusAreaMetrics {
    pub focus_area_id: String,
    pub hypotheses: HypothesisCounts,
    pub validation_rate: u32,
    /// Interview notes across target and linked archetypes.
    pub interview_count: usize,
    pub delivered_features: usize,
    pub open_blockers: usize,
    pub idea_count: usize,
    pub decision_count: usize,
    pub objective_count: usize,
    pub objective_progress: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeMetrics {
    pub archetype_id: String,
    pub hypotheses: HypothesisCounts,
    pub validation_rate: u32,
    pub interview_count: usize,
    pub idea_count: usize,
    pub journey_map_count: usize,
    pub focus_area_count: usize,
    #[serde(flatten)]
    pub scores: ArchetypeScores,
}

/// Metrics for one focus area, or `None` when it is not in the snapshot.
pub fn focus_area_metrics(ws: &Workspace, id: &str) -> Option<FocusAreaMetrics> {
    let focus = resolve_one(&ws.focus_areas, id)?;

    let hypotheses =
        HypothesisCounts::tally(ws.hypotheses.iter().filter(|h| link_is(&h.focus_area_id, id)));

    // Union of forward targets and archetypes linking back, each counted once
    let archetype_ids: BTreeSet<&str> = resolve(&ws.archetypes, &focus.target_archetype_ids)
        .into_iter()
        .chain(
            ws.archetypes
                .iter()
                .filter(|a| links_to(&a.related_focus_area_ids, id)),
        )
        .map(|a| a.id.as_str())
        .collect();
    let interview_count = archetype_ids
        .iter()
        .map(|archetype_id| ws.interview_count(archetype_id))
        .sum();

    let delivered_features = ws
        .changelog
        .iter()
        .filter(|c| link_is(&c.focus_area_id, id) && c.change_type == ChangeType::Feature)
        .count();
    let open_blockers = ws
        .blockers
        .iter()
        .filter(|b| link_is(&b.focus_area_id, id) && b.status == BlockerStatus::Open)
        .count();

    let objectives: Vec<_> = ws
        .objectives
        .iter()
        .filter(|o| links_to(&o.focus_area_ids, id))
        .collect();

    Some(FocusAreaMetrics {
        focus_area_id: focus.id.clone(),
        validation_rate: hypotheses.validation_rate(),
        hypotheses,
        interview_count,
        delivered_features,
        open_blockers,
        idea_count: ws.ideas.iter().filter(|i| link_is(&i.focus_area_id, id)).count(),
        decision_count: ws
            .decisions
            .iter()
            .filter(|d| link_is(&d.focus_area_id, id))
            .count(),
        objective_count: objectives.len(),
        objective_progress: objective_progress(objectives.iter().flat_map(|o| &o.key_results)),
    })
}

/// Metrics for one archetype, or `None` when it is not in the snapshot.
pub fn archetype_metrics(ws: &Workspace, id: &str) -> Option<ArchetypeMetrics> {
    let archetype = resolve_one(&ws.archetypes, id)?;

    let hypotheses =
        HypothesisCounts::tally(ws.hypotheses.iter().filter(|h| link_is(&h.archetype_id, id)));

    let focus_area_ids: BTreeSet<&str> =
        resolve(&ws.focus_areas, &archetype.related_focus_area_ids)
            .into_iter()
            .chain(
                ws.focus_areas
                    .iter()
                    .filter(|f| links_to(&f.target_archetype_ids, id)),
            )
            .map(|f| f.id.as_str())
            .collect();

    Some(ArchetypeMetrics {
        archetype_id: archetype.id.clone(),
        validation_rate: hypotheses.validation_rate(),
        hypotheses,
        interview_count: ws.interview_count(id),
        idea_count: ws
            .ideas
            .iter()
            .filter(|i| link_is(&i.target_archetype_id, id))
            .count(),
        journey_map_count: ws
            .journey_maps
            .iter()
            .filter(|j| link_is(&j.archetype_id, id))
            .count(),
        focus_area_count: focus_area_ids.len(),
        scores: score_archetype(ws, archetype),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_model::*;

    fn hypothesis(id: &str, status: HypothesisStatus, focus: &str) -> Hypothesis {
        Hypothesis {
            status,
            focus_area_id: Some(focus.into()),
            ..Hypothesis::new(id, "belief")
        }
    }

    fn note(id: &str, archetype: &str) -> InterviewNote {
        InterviewNote {
            id: id.into(),
            archetype_id: Some(archetype.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_rate() {
        assert_eq!(validation_rate(0, 0), 0);
        assert_eq!(validation_rate(3, 1), 75);
        assert_eq!(validation_rate(2, 1), 67);
        assert_eq!(validation_rate(0, 5), 0);
        assert_eq!(validation_rate(5, 0), 100);
    }

    #[test]
    fn test_objective_progress_ignores_zero_targets_and_caps() {
        let krs = vec![
            KeyResult { target: 10.0, current: 5.0, ..Default::default() },
            KeyResult { target: 4.0, current: 8.0, ..Default::default() },
            KeyResult { target: 0.0, current: 3.0, ..Default::default() },
        ];
        assert_eq!(objective_progress(&krs), 75);
        assert_eq!(objective_progress(&Vec::<KeyResult>::new()), 0);
    }

    #[test]
    fn test_focus_area_metrics() {
        let mut ws = Workspace::new();
        ws.focus_areas.push(FocusArea {
            target_archetype_ids: vec!["ar-1".into(), "ar-ghost".into()],
            ..FocusArea::new("fa-1", "Onboarding")
        });
        ws.archetypes.push(CustomerArchetype::new("ar-1", "Admin"));
        ws.archetypes.push(CustomerArchetype {
            related_focus_area_ids: vec!["fa-1".into()],
            ..CustomerArchetype::new("ar-2", "Champion")
        });
        ws.interview_notes.push(note("n-1", "ar-1"));
        ws.interview_notes.push(note("n-2", "ar-1"));
        ws.interview_notes.push(note("n-3", "ar-2"));
        ws.interview_notes.push(note("n-4", "ar-ghost"));

        ws.hypotheses.push(hypothesis("h-1", HypothesisStatus::Validated, "fa-1"));
        ws.hypotheses.push(hypothesis("h-2", HypothesisStatus::Validated, "fa-1"));
        ws.hypotheses.push(hypothesis("h-3", HypothesisStatus::Invalidated, "fa-1"));
        ws.hypotheses.push(hypothesis("h-4", HypothesisStatus::Active, "fa-1"));
        ws.hypotheses.push(hypothesis("h-5", HypothesisStatus::Active, "fa-2"));

        ws.changelog.push(ChangelogEntry {
            focus_area_id: Some("fa-1".into()),
            ..ChangelogEntry::new("c-1", "Templates")
        });
        ws.changelog.push(ChangelogEntry {
            change_type: ChangeType::Fix,
            focus_area_id: Some("fa-1".into()),
            ..ChangelogEntry::new("c-2", "Fix import")
        });
        ws.blockers.push(Blocker {
            focus_area_id: Some("fa-1".into()),
            ..Blocker::new("b-1", "Legal")
        });
        ws.blockers.push(Blocker {
            status: BlockerStatus::Resolved,
            focus_area_id: Some("fa-1".into()),
            ..Blocker::new("b-2", "Budget")
        });
        ws.objectives.push(Objective {
            focus_area_ids: vec!["fa-1".into()],
            key_results: vec![KeyResult { target: 10.0, current: 4.0, ..Default::default() }],
            ..Objective::new("o-1", "Activation")
        });

        let metrics = focus_area_metrics(&ws, "fa-1").unwrap();
        assert_eq!(
            metrics.hypotheses,
            HypothesisCounts { total: 4, validated: 2, invalidated: 1, active: 1 }
        );
        assert_eq!(metrics.validation_rate, 67);
        assert_eq!(metrics.interview_count, 3);
        assert_eq!(metrics.delivered_features, 1);
        assert_eq!(metrics.open_blockers, 1);
        assert_eq!(metrics.objective_count, 1);
        assert_eq!(metrics.objective_progress, 40);

        assert!(focus_area_metrics(&ws, "fa-missing").is_none());
    }

    #[test]
    fn test_archetype_metrics() {
        let mut ws = Workspace::new();
        ws.archetypes.push(CustomerArchetype {
            related_focus_area_ids: vec!["fa-1".into()],
            ..CustomerArchetype::new("ar-1", "Admin")
        });
        ws.focus_areas.push(FocusArea {
            target_archetype_ids: vec!["ar-1".into()],
            ..FocusArea::new("fa-1", "Onboarding")
        });
        ws.focus_areas.push(FocusArea {
            target_archetype_ids: vec!["ar-1".into()],
            ..FocusArea::new("fa-2", "Billing")
        });
        ws.interview_notes.push(note("n-1", "ar-1"));
        ws.interview_notes.push(note("n-2", "ar-1"));

        let metrics = archetype_metrics(&ws, "ar-1").unwrap();
        assert_eq!(metrics.focus_area_count, 2);
        assert_eq!(metrics.interview_count, 2);
        assert_eq!(metrics.scores.readiness_score, 25);
        assert_eq!(metrics.validation_rate, 0);
    }
}
