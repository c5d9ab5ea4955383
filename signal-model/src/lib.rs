//! Signal workspace data model.
//!
//! Every record is an independent top-level document identified by an opaque
//! string id. Relationships are soft links: a record stores the id(s) of
//! another record and nothing guarantees the target still exists. Consumers
//! treat an unresolvable id as "not found", never as an error.
//!
//! # Families
//!
//! ```text
//! FocusArea ──targetArchetypeIds──▶ CustomerArchetype ──relatedFocusAreaIds──▶ FocusArea
//!     ▲                                   ▲
//!     │ focusAreaId                       │ archetypeId
//! Hypothesis ◀──relatedHypothesisIds── Decision
//!     ▲
//!     │ validatedHypothesisIds
//! ChangelogEntry
//! ```

pub mod context;
pub mod entities;
pub mod kind;
pub mod status;
pub mod user;
pub mod workspace;

pub use context::{CompanyContextRecord, StrategicContextRecord, VisionRecord};
pub use entities::*;
pub use kind::{Entity, EntityKind, UnknownKind};
pub use status::*;
pub use user::{UserProfile, UserRole};
pub use workspace::Workspace;
