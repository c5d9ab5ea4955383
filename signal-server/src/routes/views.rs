//! Read-only workspace views
//!
//! Every view loads the whole workspace and runs a pure engine function over
//! it. Any authenticated role may read them except usage, which is admin only.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use signal_engine::{
    alignment_warnings, archetype_metrics, focus_area_metrics, related, workspace_health,
};
use signal_gateway::{GatewayError, UsageEntry, UsageStats};
use signal_model::{EntityKind, UserRole, Workspace};
use signal_store::load_workspace;

use crate::routes::{error_response, json_response, not_found_response};
use crate::server::AppState;

const DEFAULT_USAGE_LIMIT: usize = 50;

async fn authorized_workspace(
    state: &AppState,
    token: Option<&str>,
) -> Result<Workspace, GatewayError> {
    state.service.authorize_roles(token, UserRole::ANY).await?;
    Ok(load_workspace(state.store.as_ref()).await?)
}

pub async fn related_view(
    state: &AppState,
    token: Option<&str>,
    kind: &str,
    id: &str,
) -> Response<Full<Bytes>> {
    let Ok(kind) = kind.parse::<EntityKind>() else {
        return not_found_response(&format!("/api/related/{}/{}", kind, id));
    };
    match authorized_workspace(state, token).await {
        Ok(ws) => json_response(StatusCode::OK, &related(&ws, kind, id)),
        Err(e) => error_response(&e),
    }
}

pub async fn focus_area_metrics_view(
    state: &AppState,
    token: Option<&str>,
    id: &str,
) -> Response<Full<Bytes>> {
    match authorized_workspace(state, token).await {
        Ok(ws) => match focus_area_metrics(&ws, id) {
            Some(metrics) => json_response(StatusCode::OK, &metrics),
            None => not_found_response(&format!("/api/metrics/focus-areas/{}", id)),
        },
        Err(e) => error_response(&e),
    }
}

pub async fn archetype_metrics_view(
    state: &AppState,
    token: Option<&str>,
    id: &str,
) -> Response<Full<Bytes>> {
    match authorized_workspace(state, token).await {
        Ok(ws) => match archetype_metrics(&ws, id) {
            Some(metrics) => json_response(StatusCode::OK, &metrics),
            None => not_found_response(&format!("/api/metrics/archetypes/{}", id)),
        },
        Err(e) => error_response(&e),
    }
}

pub async fn alignment_view(state: &AppState, token: Option<&str>) -> Response<Full<Bytes>> {
    match authorized_workspace(state, token).await {
        Ok(ws) => json_response(StatusCode::OK, &alignment_warnings(&ws)),
        Err(e) => error_response(&e),
    }
}

pub async fn health_summary_view(state: &AppState, token: Option<&str>) -> Response<Full<Bytes>> {
    match authorized_workspace(state, token).await {
        Ok(ws) => json_response(StatusCode::OK, &workspace_health(&ws)),
        Err(e) => error_response(&e),
    }
}

#[derive(Serialize)]
pub struct UsageReport {
    pub stats: UsageStats,
    pub entries: Vec<UsageEntry>,
}

/// `limit` from a query string such as `limit=20&x=y`.
fn parse_limit(query: Option<&str>) -> usize {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| pair.strip_prefix("limit="))
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_USAGE_LIMIT)
}

pub async fn usage_view(
    state: &AppState,
    token: Option<&str>,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    if let Err(e) = state.service.authorize_roles(token, &[UserRole::Admin]).await {
        return error_response(&e);
    }

    let usage = state.service.usage_log();
    let report = UsageReport {
        stats: usage.stats().await,
        entries: usage.recent(parse_limit(query)).await,
    };
    json_response(StatusCode::OK, &report)
}
