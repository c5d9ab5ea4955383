//! Signal server - HTTP surface for the enrichment gateway
//!
//! Routes:
//! - `POST /rpc/{operation}` - enrichment operations and write workflows
//! - `GET /api/related/{kind}/{id}` - related entities for any record
//! - `GET /api/metrics/...` - per focus area and per archetype metrics
//! - `GET /api/alignment`, `/api/health-summary` - workspace-wide views
//! - `GET /api/usage` - recent invocations (admin only)
//! - `GET /health` - liveness

pub mod config;
pub mod routes;
pub mod server;

pub use config::Args;
pub use server::{run, AppState};
