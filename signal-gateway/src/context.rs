//! Context reads for prompt assembly.
//!
//! Optional context is best effort: a failed or missing read is logged and
//! the corresponding prompt section is omitted. Required context (an id the
//! caller named) must resolve.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

use signal_model::{
    CompanyContextRecord, CustomerArchetype, FocusArea, Hypothesis, Idea, StrategicContextRecord,
    VisionRecord,
};
use signal_store::{get_typed, list_typed, Collection, DocumentStore};

use crate::error::GatewayError;

#[derive(Clone)]
pub struct ContextReader {
    store: Arc<dyn DocumentStore>,
}

impl ContextReader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn optional<T: DeserializeOwned>(&self, collection: Collection, id: &str) -> Option<T> {
        match get_typed(self.store.as_ref(), collection, id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(%collection, %id, error = %e, "Optional context unavailable");
                None
            }
        }
    }

    async fn optional_list<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        list_typed(self.store.as_ref(), collection)
            .await
            .unwrap_or_else(|e| {
                warn!(%collection, error = %e, "Optional context unavailable");
                Vec::new()
            })
    }

    pub async fn vision(&self) -> Option<VisionRecord> {
        self.optional(Collection::Vision, VisionRecord::DOCUMENT_ID)
            .await
    }

    pub async fn strategic_context(&self) -> Option<StrategicContextRecord> {
        self.optional(Collection::StrategicContext, StrategicContextRecord::DOCUMENT_ID)
            .await
    }

    pub async fn company_context(&self) -> Option<CompanyContextRecord> {
        self.optional(Collection::CompanyContext, CompanyContextRecord::DOCUMENT_ID)
            .await
    }

    pub async fn active_focus_areas(&self) -> Vec<FocusArea> {
        self.optional_list::<FocusArea>(Collection::FocusAreas)
            .await
            .into_iter()
            .filter(FocusArea::is_active)
            .collect()
    }

    /// Archetypes that are not archived.
    pub async fn archetypes(&self) -> Vec<CustomerArchetype> {
        self.optional_list::<CustomerArchetype>(Collection::Archetypes)
            .await
            .into_iter()
            .filter(CustomerArchetype::is_active)
            .collect()
    }

    pub async fn hypotheses(&self) -> Vec<Hypothesis> {
        self.optional_list(Collection::Hypotheses).await
    }

    pub async fn archetype_opt(&self, id: Option<&str>) -> Option<CustomerArchetype> {
        self.optional(Collection::Archetypes, id?).await
    }

    pub async fn focus_area_opt(&self, id: Option<&str>) -> Option<FocusArea> {
        self.optional(Collection::FocusAreas, id?).await
    }

    pub async fn idea_opt(&self, id: Option<&str>) -> Option<Idea> {
        self.optional(Collection::Ideas, id?).await
    }

    /// An archetype the caller named in `field`.
    pub async fn archetype(&self, field: &str, id: &str) -> Result<CustomerArchetype, GatewayError> {
        get_typed(self.store.as_ref(), Collection::Archetypes, id)
            .await?
            .ok_or_else(|| GatewayError::invalid(field, format!("archetype {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use signal_model::ArchetypeStatus;
    use signal_store::{add_record, MemoryStore};

    #[tokio::test]
    async fn test_missing_optional_context_is_none() {
        let reader = ContextReader::new(Arc::new(MemoryStore::new()));
        assert!(reader.vision().await.is_none());
        assert!(reader.company_context().await.is_none());
        assert!(reader.archetype_opt(None).await.is_none());
        assert!(reader.archetype_opt(Some("ar-x")).await.is_none());
        assert!(reader.hypotheses().await.is_empty());
    }

    #[tokio::test]
    async fn test_archived_archetypes_filtered() {
        let store = Arc::new(MemoryStore::new());
        add_record(store.as_ref(), Collection::Archetypes, &CustomerArchetype::new("ar-1", "Admin"))
            .await
            .unwrap();
        add_record(
            store.as_ref(),
            Collection::Archetypes,
            &CustomerArchetype {
                status: ArchetypeStatus::Archived,
                ..CustomerArchetype::new("ar-2", "Old")
            },
        )
        .await
        .unwrap();

        let reader = ContextReader::new(store);
        let names: Vec<String> = reader.archetypes().await.into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Admin".to_string()]);
    }

    #[tokio::test]
    async fn test_required_archetype_names_field() {
        let reader = ContextReader::new(Arc::new(MemoryStore::new()));
        let err = reader.archetype("archetypeId", "ar-x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("archetypeId"));
    }
}
