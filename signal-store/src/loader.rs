//! Workspace snapshot loading.

use signal_model::Workspace;
use tracing::debug;

use crate::collection::Collection;
use crate::error::StoreError;
use crate::store::{list_typed, DocumentStore};

/// Read every linkable collection into a [`Workspace`] snapshot.
///
/// Collections are fetched concurrently. The snapshot is only as consistent
/// as the store's reads; there is no cross-collection isolation.
pub async fn load_workspace(store: &dyn DocumentStore) -> Result<Workspace, StoreError> {
    let (focus_areas, archetypes, hypotheses, ideas, journey_maps, decisions) = futures::try_join!(
        list_typed(store, Collection::FocusAreas),
        list_typed(store, Collection::Archetypes),
        list_typed(store, Collection::Hypotheses),
        list_typed(store, Collection::Ideas),
        list_typed(store, Collection::JourneyMaps),
        list_typed(store, Collection::Decisions),
    )?;

    let (objectives, documents, changelog, blockers, interview_notes) = futures::try_join!(
        list_typed(store, Collection::Objectives),
        list_typed(store, Collection::Documents),
        list_typed(store, Collection::Changelog),
        list_typed(store, Collection::Blockers),
        list_typed(store, Collection::InterviewNotes),
    )?;

    let workspace = Workspace {
        focus_areas,
        archetypes,
        hypotheses,
        ideas,
        journey_maps,
        decisions,
        objectives,
        documents,
        changelog,
        blockers,
        interview_notes,
    };

    debug!(
        focus_areas = workspace.focus_areas.len(),
        archetypes = workspace.archetypes.len(),
        hypotheses = workspace.hypotheses.len(),
        "Loaded workspace snapshot"
    );

    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::DocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_workspace_skips_malformed_documents() {
        let store = MemoryStore::new();
        store
            .add(Collection::FocusAreas, json!({ "title": "Onboarding", "status": "active" }))
            .await
            .unwrap();
        // Missing required `title`
        store
            .add(Collection::FocusAreas, json!({ "status": "active" }))
            .await
            .unwrap();
        store
            .add(
                Collection::InterviewNotes,
                json!({ "title": "Call 1", "archetypeId": "ar-1" }),
            )
            .await
            .unwrap();

        let workspace = load_workspace(&store).await.unwrap();
        assert_eq!(workspace.focus_areas.len(), 1);
        assert_eq!(workspace.interview_count("ar-1"), 1);
        assert!(workspace.hypotheses.is_empty());
    }
}
