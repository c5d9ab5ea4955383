//! `POST /rpc/{operation}`
//!
//! Enrichment kinds go through `EnrichmentService::invoke`. The two write
//! workflows authorize here and call the service directly.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use signal_gateway::{parse_payload, EnrichmentKind, GatewayError};

use crate::routes::{error_response, json_response, not_found_response};
use crate::server::AppState;

const TRANSITION_HYPOTHESIS_STATUS: &str = "transition-hypothesis-status";
const RESCORE_ARCHETYPE: &str = "rescore-archetype";

/// Empty bodies are treated as an empty payload.
fn payload_from(body: &[u8]) -> Result<Value, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::invalid("payload", e.to_string()))
}

fn respond<T: Serialize>(result: Result<T, GatewayError>) -> Response<Full<Bytes>> {
    match result {
        Ok(value) => json_response(StatusCode::OK, &value),
        Err(e) => error_response(&e),
    }
}

pub async fn handle_rpc(
    state: &AppState,
    operation: &str,
    token: Option<&str>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let workflow = operation == TRANSITION_HYPOTHESIS_STATUS || operation == RESCORE_ARCHETYPE;
    let kind = EnrichmentKind::from_str(operation).ok();
    if !workflow && kind.is_none() {
        debug!(%operation, "Unknown RPC operation");
        return not_found_response(&format!("/rpc/{}", operation));
    }

    let payload = match payload_from(&body) {
        Ok(payload) => payload,
        Err(e) => return error_response(&e),
    };

    let service = &state.service;
    if let Some(kind) = kind {
        return respond(service.invoke(kind, token, payload).await);
    }

    let caller = match service.authorize(token).await {
        Ok(caller) => caller,
        Err(e) => return error_response(&e),
    };

    if operation == TRANSITION_HYPOTHESIS_STATUS {
        let result = match parse_payload(payload) {
            Ok(payload) => service.transition_hypothesis_status(&caller, payload).await,
            Err(e) => Err(e),
        };
        respond(result)
    } else {
        let result = match parse_payload(payload) {
            Ok(payload) => service.rescore_archetype(&caller, payload).await,
            Err(e) => Err(e),
        };
        respond(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_body_is_null_payload() {
        assert_eq!(payload_from(b"").unwrap(), Value::Null);
        assert_eq!(payload_from(b"  \n").unwrap(), Value::Null);
        assert_eq!(payload_from(br#"{"a": 1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_malformed_body_names_payload() {
        let err = payload_from(b"{oops").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument { ref field, .. } if field == "payload"));
    }
}
