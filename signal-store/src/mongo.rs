//! MongoDB-backed document store.
//!
//! Each collection maps to a MongoDB collection of the same name. The record
//! id is stored in `_id` as a string and surfaced as `id` on read.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::collection::Collection;
use crate::error::StoreError;
use crate::store::{require_object, timestamp, DocumentStore};

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db_name: String,
}

impl MongoStore {
    /// Connect and verify the connection with a ping.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast on an unreachable server instead of hanging on selection
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.client
            .database(&self.db_name)
            .collection::<Document>(collection.as_str())
    }
}

/// Convert a stored BSON document into the JSON shape callers see.
fn to_json(document: Document) -> Value {
    let mut value = Bson::Document(document).into_relaxed_extjson();
    if let Value::Object(map) = &mut value {
        if let Some(id) = map.remove("_id") {
            map.insert("id".to_string(), id);
        }
    }
    value
}

fn to_bson(map: serde_json::Map<String, Value>) -> Result<Document, StoreError> {
    bson::to_document(&map).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}

fn db_error(action: &str, e: mongodb::error::Error) -> StoreError {
    StoreError::Database(format!("{} failed: {}", action, e))
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .sort(doc! { "createdAt": 1 })
            .await
            .map_err(|e| db_error("Find", e))?;

        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| db_error("Cursor read", e))?;

        Ok(documents.into_iter().map(to_json).collect())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let document = self
            .collection(collection)
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| db_error("Find", e))?;

        Ok(document.map(to_json))
    }

    async fn add(&self, collection: Collection, document: Value) -> Result<String, StoreError> {
        let mut map = require_object(document)?;

        let id = match map.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let now = timestamp();
        map.insert("_id".to_string(), Value::String(id.clone()));
        map.insert("createdAt".to_string(), now.clone());
        map.insert("updatedAt".to_string(), now);

        let body = to_bson(map)?;
        self.collection(collection)
            .replace_one(doc! { "_id": id.as_str() }, body)
            .upsert(true)
            .await
            .map_err(|e| db_error("Insert", e))?;

        debug!(%collection, %id, "Added document");
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        let mut map = require_object(patch)?;
        map.remove("id");
        map.insert("updatedAt".to_string(), timestamp());

        let set = to_bson(map)?;
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await
            .map_err(|e| db_error("Update", e))?;

        if result.matched_count == 0 {
            return Err(StoreError::not_found(collection, id));
        }

        debug!(%collection, %id, "Updated document");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| db_error("Delete", e))?;

        if result.deleted_count == 0 {
            return Err(StoreError::not_found(collection, id));
        }

        debug!(%collection, %id, "Deleted document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_surfaces_id() {
        let value = to_json(doc! { "_id": "fa-1", "title": "Onboarding" });
        assert_eq!(value["id"], "fa-1");
        assert_eq!(value["title"], "Onboarding");
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn test_to_bson_keeps_nested_fields() {
        let map = serde_json::json!({ "steps": [{ "order": 1, "title": "Sign up" }] });
        let Value::Object(map) = map else {
            unreachable!()
        };
        let document = to_bson(map).unwrap();
        assert!(document.get_array("steps").is_ok());
    }
}
