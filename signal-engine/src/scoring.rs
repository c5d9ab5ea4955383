//! Archetype confidence and readiness scores.
//!
//! The scores stored on an archetype are caches. These functions are the
//! source of truth and are always recomputed from scratch.

use serde::{Deserialize, Serialize};

use signal_model::{CustomerArchetype, ValidationStatus, Workspace};

/// Interviews needed for full readiness when an archetype sets no target.
pub const DEFAULT_INTERVIEW_TARGET: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeScores {
    pub confidence_score: u32,
    pub readiness_score: u32,
}

/// Share of validated assumptions across all six lists, partial validation
/// counting half. Zero when the archetype lists no assumptions.
pub fn confidence_score(archetype: &CustomerArchetype) -> u32 {
    let mut total = 0u32;
    let mut validated = 0u32;
    let mut partial = 0u32;

    for item in archetype.assumptions() {
        total += 1;
        match item.validation_status {
            ValidationStatus::Validated => validated += 1,
            ValidationStatus::PartiallyValidated => partial += 1,
            ValidationStatus::Hypothesis | ValidationStatus::Invalidated => {}
        }
    }

    if total == 0 {
        return 0;
    }

    let weighted = f64::from(validated) + f64::from(partial) * 0.5;
    (100.0 * weighted / f64::from(total)).round() as u32
}

/// Interview coverage against the archetype's target, capped at 100.
///
/// A target of zero is treated as unset.
pub fn readiness_score(interview_count: usize, interview_target: Option<u32>) -> u32 {
    let target = match interview_target {
        Some(t) if t > 0 => t,
        _ => DEFAULT_INTERVIEW_TARGET,
    };

    let ratio = 100.0 * interview_count as f64 / f64::from(target);
    ratio.round().min(100.0) as u32
}

/// Both scores for one archetype within a snapshot.
pub fn score_archetype(workspace: &Workspace, archetype: &CustomerArchetype) -> ArchetypeScores {
    ArchetypeScores {
        confidence_score: confidence_score(archetype),
        readiness_score: readiness_score(
            workspace.interview_count(&archetype.id),
            archetype.interview_target,
        ),
    }
}

/// Overwrite the cached scores on `archetype`. Returns the new scores.
pub fn refresh_scores(workspace: &Workspace, archetype: &mut CustomerArchetype) -> ArchetypeScores {
    let scores = score_archetype(workspace, archetype);
    archetype.confidence_score = scores.confidence_score;
    archetype.readiness_score = scores.readiness_score;
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_model::{AssumptionItem, InterviewNote};

    fn items(status: ValidationStatus, n: usize) -> Vec<AssumptionItem> {
        (0..n)
            .map(|i| AssumptionItem::new(format!("item {}", i), status))
            .collect()
    }

    #[test]
    fn test_confidence_zero_without_assumptions() {
        let archetype = CustomerArchetype::new("ar-1", "Ops lead");
        assert_eq!(confidence_score(&archetype), 0);
    }

    #[test]
    fn test_confidence_weights_partial_validation() {
        // 4 validated + 2 partial out of 10, spread over several lists
        let mut pain_points = items(ValidationStatus::Validated, 3);
        pain_points.extend(items(ValidationStatus::Hypothesis, 2));
        let archetype = CustomerArchetype {
            pain_points,
            goals: items(ValidationStatus::Validated, 1),
            metrics: items(ValidationStatus::PartiallyValidated, 2),
            objections: items(ValidationStatus::Invalidated, 2),
            ..CustomerArchetype::new("ar-1", "Ops lead")
        };
        assert_eq!(confidence_score(&archetype), 50);
    }

    #[test]
    fn test_confidence_rounds_half_up() {
        // 1 partial of 4 = 12.5
        let mut goals = items(ValidationStatus::PartiallyValidated, 1);
        goals.extend(items(ValidationStatus::Hypothesis, 3));
        let archetype = CustomerArchetype {
            goals,
            ..CustomerArchetype::new("ar-1", "Ops lead")
        };
        assert_eq!(confidence_score(&archetype), 13);
    }

    #[test]
    fn test_readiness_defaults_and_caps() {
        assert_eq!(readiness_score(0, None), 0);
        assert_eq!(readiness_score(3, None), 38);
        assert_eq!(readiness_score(4, Some(0)), 50);
        assert_eq!(readiness_score(12, Some(10)), 100);
        assert_eq!(readiness_score(1, Some(3)), 33);
    }

    #[test]
    fn test_refresh_scores_is_idempotent() {
        let mut ws = Workspace::new();
        for i in 0..2 {
            ws.interview_notes.push(InterviewNote {
                id: format!("n-{}", i),
                archetype_id: Some("ar-1".into()),
                ..Default::default()
            });
        }
        let mut archetype = CustomerArchetype {
            confidence_score: 99,
            readiness_score: 99,
            interview_target: Some(4),
            solutions: items(ValidationStatus::Validated, 1),
            ..CustomerArchetype::new("ar-1", "Ops lead")
        };

        let first = refresh_scores(&ws, &mut archetype);
        let second = refresh_scores(&ws, &mut archetype);
        assert_eq!(first, second);
        assert_eq!(archetype.confidence_score, 100);
        assert_eq!(archetype.readiness_score, 50);
    }
}
