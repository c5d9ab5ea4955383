//! Signal document store.
//!
//! The workspace lives in a managed document database. This crate hides it
//! behind [`DocumentStore`], a whole-document add/update/delete interface with
//! server-assigned timestamps. There are no cross-document transactions and no
//! optimistic concurrency: the last writer wins.
//!
//! Implementations:
//! - [`MemoryStore`] for development mode and tests
//! - [`MongoStore`] backed by MongoDB, one collection per entity kind

pub mod collection;
pub mod error;
pub mod loader;
pub mod memory;
pub mod mongo;
pub mod store;

pub use collection::Collection;
pub use error::StoreError;
pub use loader::load_workspace;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::{add_record, get_typed, list_typed, DocumentStore};
