//! Store error types.

use crate::collection::Collection;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend failure (connection, query, write)
    #[error("Database error: {0}")]
    Database(String),

    /// No document with this id
    #[error("{collection} document not found: {id}")]
    NotFound { collection: Collection, id: String },

    /// Document body is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }
}
