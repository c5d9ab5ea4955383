//! Write workflows that pair a store update with engine logic.
//!
//! Status transitions write the hypothesis first and the synthesized decision
//! second. The two documents are independent, so a failed decision write is
//! reported as an error after the status change has already committed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use signal_engine::{score_archetype, synthesize_decision, ArchetypeScores};
use signal_model::{Hypothesis, HypothesisStatus, Workspace};
use signal_store::{add_record, get_typed, list_typed, Collection};

use crate::auth::Caller;
use crate::error::GatewayError;
use crate::payload::{required, RescoreArchetypePayload, TransitionHypothesisPayload};
use crate::service::EnrichmentService;

/// Result of a status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub hypothesis_id: String,
    pub status: HypothesisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<String>,
}

fn parse_status(value: &str) -> Result<HypothesisStatus, GatewayError> {
    serde_json::from_value(Value::String(value.to_string())).map_err(|_| {
        GatewayError::invalid(
            "status",
            "must be one of draft, active, validated, invalidated, parked",
        )
    })
}

impl EnrichmentService {
    /// Move a hypothesis to a new status, recording a decision stub when it
    /// is validated or invalidated unless `autoGenerateDecision` is false.
    pub async fn transition_hypothesis_status(
        &self,
        caller: &Caller,
        payload: TransitionHypothesisPayload,
    ) -> Result<TransitionOutcome, GatewayError> {
        let hypothesis_id = required(&payload.hypothesis_id, "hypothesisId")?;
        let status = parse_status(required(&payload.status, "status")?)?;
        let auto_generate = payload.auto_generate_decision.unwrap_or(true);

        let store = self.store.as_ref();
        let hypothesis: Hypothesis = get_typed(store, Collection::Hypotheses, hypothesis_id)
            .await?
            .ok_or_else(|| {
                GatewayError::invalid(
                    "hypothesisId",
                    format!("hypothesis {} not found", hypothesis_id),
                )
            })?;

        store
            .update(Collection::Hypotheses, hypothesis_id, json!({ "status": status }))
            .await?;
        info!(
            %hypothesis_id,
            from = ?hypothesis.status,
            to = ?status,
            user_id = %caller.user_id,
            "Hypothesis status updated"
        );

        let mut outcome = TransitionOutcome {
            hypothesis_id: hypothesis_id.to_string(),
            status,
            decision_id: None,
        };
        if !auto_generate {
            return Ok(outcome);
        }

        let focus_area = self
            .context
            .focus_area_opt(hypothesis.focus_area_id.as_deref())
            .await;
        let Some(mut decision) = synthesize_decision(&hypothesis, status, focus_area.as_ref())
        else {
            return Ok(outcome);
        };
        decision.meta.created_by = Some(caller.user_id.clone());

        let decision_id = add_record(store, Collection::Decisions, &decision)
            .await
            .map_err(|e| {
                error!(%hypothesis_id, error = %e, "Decision write failed after status update");
                GatewayError::Internal(format!(
                    "Hypothesis status updated but decision generation failed: {}",
                    e
                ))
            })?;
        info!(%hypothesis_id, %decision_id, "Decision generated");

        outcome.decision_id = Some(decision_id);
        Ok(outcome)
    }

    /// Recompute an archetype's cached confidence and readiness scores and
    /// persist them.
    pub async fn rescore_archetype(
        &self,
        _caller: &Caller,
        payload: RescoreArchetypePayload,
    ) -> Result<ArchetypeScores, GatewayError> {
        let archetype_id = required(&payload.archetype_id, "archetypeId")?;
        let archetype = self.context.archetype("archetypeId", archetype_id).await?;

        let store = self.store.as_ref();
        let workspace = Workspace {
            interview_notes: list_typed(store, Collection::InterviewNotes).await?,
            ..Workspace::new()
        };
        let scores = score_archetype(&workspace, &archetype);

        store
            .update(
                Collection::Archetypes,
                archetype_id,
                json!({
                    "confidenceScore": scores.confidence_score,
                    "readinessScore": scores.readiness_score,
                }),
            )
            .await?;
        info!(
            %archetype_id,
            confidence = scores.confidence_score,
            readiness = scores.readiness_score,
            "Archetype rescored"
        );

        Ok(scores)
    }
}
