//! Liveness endpoint

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::json_response;
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always true while the process is serving
    pub healthy: bool,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    /// "development" or "production"
    pub mode: &'static str,
    /// Whether the text model answered its availability check
    pub model_available: bool,
}

pub async fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    let body = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        model_available: state.service.backend_available().await,
    };
    json_response(StatusCode::OK, &body)
}
