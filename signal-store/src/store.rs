//! The [`DocumentStore`] trait and typed helpers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::collection::Collection;
use crate::error::StoreError;

/// Whole-document access to workspace collections.
///
/// Documents are JSON objects whose `id` field holds the record id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in a collection, oldest first.
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// A single document, or `None` when the id does not resolve.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert a document and return its id.
    ///
    /// Uses the document's own `id` when present and non-empty, otherwise
    /// assigns a fresh one. Sets `createdAt` and `updatedAt`.
    async fn add(&self, collection: Collection, document: Value) -> Result<String, StoreError>;

    /// Merge top-level fields of `patch` into an existing document and
    /// refresh `updatedAt`.
    async fn update(&self, collection: Collection, id: &str, patch: Value)
        -> Result<(), StoreError>;

    /// Irreversibly remove a document.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}

/// List a collection as typed records.
///
/// Documents that do not match the record shape are skipped with a warning
/// rather than failing the whole read.
pub async fn list_typed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
) -> Result<Vec<T>, StoreError> {
    let documents = store.list(collection).await?;
    let mut records = Vec::with_capacity(documents.len());

    for document in documents {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<missing id>")
            .to_string();
        match serde_json::from_value::<T>(document) {
            Ok(record) => records.push(record),
            Err(e) => warn!(%collection, %id, error = %e, "Skipping malformed document"),
        }
    }

    Ok(records)
}

/// Fetch one typed record.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(collection, id).await? {
        Some(document) => Ok(Some(serde_json::from_value(document)?)),
        None => Ok(None),
    }
}

/// Serialize and insert a typed record.
pub async fn add_record<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: Collection,
    record: &T,
) -> Result<String, StoreError> {
    let document = serde_json::to_value(record)?;
    store.add(collection, document).await
}

/// Shared validation for `add` and `update` bodies.
pub(crate) fn require_object(document: Value) -> Result<serde_json::Map<String, Value>, StoreError> {
    match document {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// Current time in the wire format used for `createdAt`/`updatedAt`.
pub(crate) fn timestamp() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
