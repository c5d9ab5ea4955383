//! Decision synthesis for resolved hypotheses.

use signal_model::{
    Decision, DecisionCategory, DecisionOption, DecisionStatus, FocusArea, Hypothesis,
    HypothesisStatus,
};

fn option(title: &str, description: &str, pros: &[&str], cons: &[&str]) -> DecisionOption {
    DecisionOption {
        title: title.to_string(),
        description: description.to_string(),
        pros: pros.iter().map(|s| s.to_string()).collect(),
        cons: cons.iter().map(|s| s.to_string()).collect(),
    }
}

fn validated_options() -> Vec<DecisionOption> {
    vec![
        option(
            "Proceed with implementation",
            "Commit delivery resources to act on the validated belief.",
            &["Evidence supports the belief", "Captures the opportunity early"],
            &["Commits engineering capacity"],
        ),
        option(
            "Gather more evidence",
            "Run further tests before committing resources.",
            &["Reduces residual risk"],
            &["Delays delivery", "Evidence may already be sufficient"],
        ),
    ]
}

fn invalidated_options() -> Vec<DecisionOption> {
    vec![
        option(
            "Pivot the approach",
            "Reframe the belief and test a revised hypothesis.",
            &["Keeps learning from the current investment"],
            &["Requires a new round of testing"],
        ),
        option(
            "Archive the hypothesis",
            "Stop pursuing this direction and free up capacity.",
            &["Frees capacity for stronger bets"],
            &["May discard a salvageable idea"],
        ),
    ]
}

fn context_text(hypothesis: &Hypothesis, focus_area: Option<&FocusArea>) -> String {
    let mut context = String::new();

    context.push_str(&format!("Belief: {}\n", hypothesis.belief));
    if !hypothesis.test.is_empty() {
        context.push_str(&format!("Test: {}\n", hypothesis.test));
    }
    if !hypothesis.result.is_empty() {
        context.push_str(&format!("Result: {}\n", hypothesis.result));
    }
    if let Some(focus) = focus_area {
        context.push_str(&format!("Focus area: {}\n", focus.title));
    }

    context.trim_end().to_string()
}

/// Build the decision stub recorded when a hypothesis is resolved.
///
/// Returns `None` for any status other than validated or invalidated. The
/// returned decision has an empty id; the store assigns one on insert.
pub fn synthesize_decision(
    hypothesis: &Hypothesis,
    new_status: HypothesisStatus,
    focus_area: Option<&FocusArea>,
) -> Option<Decision> {
    let (verb, options) = match new_status {
        HypothesisStatus::Validated => ("validated", validated_options()),
        HypothesisStatus::Invalidated => ("invalidated", invalidated_options()),
        _ => return None,
    };

    let title = match focus_area {
        Some(focus) => format!("Next step for {} hypothesis ({})", verb, focus.title),
        None => format!("Next step for {} hypothesis", verb),
    };

    Some(Decision {
        title,
        context: context_text(hypothesis, focus_area),
        category: DecisionCategory::Product,
        status: DecisionStatus::Proposed,
        options,
        auto_generated: true,
        focus_area_id: hypothesis.focus_area_id.clone(),
        related_hypothesis_ids: vec![hypothesis.id.clone()],
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hypothesis() -> Hypothesis {
        Hypothesis {
            test: "Five interviews".into(),
            result: "Four of five agreed".into(),
            focus_area_id: Some("fa-1".into()),
            ..Hypothesis::new("h-1", "Teams want templates")
        }
    }

    #[test]
    fn test_validated_produces_proceed_pair() {
        let focus = FocusArea::new("fa-1", "Onboarding");
        let decision =
            synthesize_decision(&hypothesis(), HypothesisStatus::Validated, Some(&focus)).unwrap();

        let titles: Vec<&str> = decision.options.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Proceed with implementation", "Gather more evidence"]);
        assert_eq!(decision.related_hypothesis_ids, vec!["h-1".to_string()]);
        assert_eq!(decision.focus_area_id.as_deref(), Some("fa-1"));
        assert!(decision.auto_generated);
        assert_eq!(decision.status, DecisionStatus::Proposed);
        assert!(decision.title.contains("Onboarding"));
        assert!(decision.context.contains("Teams want templates"));
        assert!(decision.context.contains("Four of five agreed"));
    }

    #[test]
    fn test_invalidated_produces_pivot_pair() {
        let decision =
            synthesize_decision(&hypothesis(), HypothesisStatus::Invalidated, None).unwrap();
        let titles: Vec<&str> = decision.options.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Pivot the approach", "Archive the hypothesis"]);
        assert!(!decision.context.contains("Focus area"));
    }

    #[test]
    fn test_other_statuses_produce_nothing() {
        for status in [
            HypothesisStatus::Parked,
            HypothesisStatus::Active,
            HypothesisStatus::Draft,
        ] {
            assert!(synthesize_decision(&hypothesis(), status, None).is_none());
        }
    }
}
