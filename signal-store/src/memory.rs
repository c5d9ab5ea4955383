//! In-memory document store for development mode and tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::collection::Collection;
use crate::error::StoreError;
use crate::store::{require_object, timestamp, DocumentStore};

/// Document store held entirely in memory.
///
/// Collections keep insertion order. Writes to collections marked with
/// [`MemoryStore::fail_writes_to`] return a database error, which lets tests
/// exercise partial-failure paths.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Value>>>>,
    failing_writes: Arc<RwLock<HashSet<Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `collection` fail.
    pub async fn fail_writes_to(&self, collection: Collection) {
        self.failing_writes.write().await.insert(collection);
    }

    /// Number of documents currently in a collection.
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    async fn check_writable(&self, collection: Collection) -> Result<(), StoreError> {
        if self.failing_writes.read().await.contains(&collection) {
            return Err(StoreError::Database(format!(
                "writes to {} are disabled",
                collection
            )));
        }
        Ok(())
    }
}

fn document_id(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d) == Some(id)))
            .cloned())
    }

    async fn add(&self, collection: Collection, document: Value) -> Result<String, StoreError> {
        self.check_writable(collection).await?;
        let mut map = require_object(document)?;

        let id = match map.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let now = timestamp();
        map.insert("id".to_string(), Value::String(id.clone()));
        map.insert("createdAt".to_string(), now.clone());
        map.insert("updatedAt".to_string(), now);

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        // Re-adding an existing id replaces the document in place.
        match docs.iter_mut().find(|d| document_id(d) == Some(id.as_str())) {
            Some(existing) => *existing = Value::Object(map),
            None => docs.push(Value::Object(map)),
        }

        debug!(%collection, %id, "Added document");
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        self.check_writable(collection).await?;
        let patch = require_object(patch)?;

        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| document_id(d) == Some(id)))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        if let Value::Object(fields) = document {
            for (key, value) in patch {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
            fields.insert("updatedAt".to_string(), timestamp());
        }

        debug!(%collection, %id, "Updated document");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.check_writable(collection).await?;

        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(&collection)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let before = docs.len();
        docs.retain(|d| document_id(d) != Some(id));

        if docs.len() == before {
            return Err(StoreError::not_found(collection, id));
        }

        debug!(%collection, %id, "Deleted document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let id = store
            .add(Collection::Ideas, json!({ "title": "Templates" }))
            .await
            .unwrap();

        let doc = store.get(Collection::Ideas, &id).await.unwrap().unwrap();
        assert_eq!(doc["id"], id.as_str());
        assert!(doc["createdAt"].is_string());
        assert_eq!(doc["createdAt"], doc["updatedAt"]);
    }

    #[tokio::test]
    async fn test_add_keeps_supplied_id() {
        let store = MemoryStore::new();
        let id = store
            .add(Collection::Vision, json!({ "id": "current", "statement": "x" }))
            .await
            .unwrap();
        assert_eq!(id, "current");
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let id = store
            .add(Collection::Hypotheses, json!({ "belief": "b", "status": "active" }))
            .await
            .unwrap();

        store
            .update(Collection::Hypotheses, &id, json!({ "status": "validated" }))
            .await
            .unwrap();

        let doc = store.get(Collection::Hypotheses, &id).await.unwrap().unwrap();
        assert_eq!(doc["status"], "validated");
        assert_eq!(doc["belief"], "b");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .update(Collection::Hypotheses, "nope", json!({ "status": "active" }))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_is_hard() {
        let store = MemoryStore::new();
        let id = store
            .add(Collection::Blockers, json!({ "title": "Legal review" }))
            .await
            .unwrap();

        store.delete(Collection::Blockers, &id).await.unwrap();
        assert!(store.get(Collection::Blockers, &id).await.unwrap().is_none());
        assert!(store.delete(Collection::Blockers, &id).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = MemoryStore::new();
        store.fail_writes_to(Collection::Decisions).await;

        let result = store.add(Collection::Decisions, json!({ "title": "t" })).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
        assert_eq!(store.count(Collection::Decisions).await, 0);
    }

    #[tokio::test]
    async fn test_rejects_non_object() {
        let store = MemoryStore::new();
        let result = store.add(Collection::Ideas, json!(["not", "an", "object"])).await;
        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }
}
