//! HTTP routes for Signal

pub mod health;
pub mod rpc;
pub mod views;

pub use health::health_check;
pub use rpc::handle_rpc;
pub use views::{
    alignment_view, archetype_metrics_view, focus_area_metrics_view, health_summary_view,
    related_view, usage_view,
};

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use signal_gateway::{ErrorKind, GatewayError};

fn with_cors(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

/// JSON response with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, body) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"kind":"internal","message":"Failed to serialize response"}"#.to_vec(),
            )
        }
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{kind, message}` error body with the matching status
pub fn error_response(err: &GatewayError) -> Response<Full<Bytes>> {
    json_response(status_for(err.kind()), &err.to_body())
}

/// CORS preflight response
pub fn preflight_response() -> Response<Full<Bytes>> {
    with_cors(Response::new(Full::new(Bytes::new())))
}

/// Not found response
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
        }),
    )
}

/// Bad request response
pub fn bad_request_response(message: &str) -> Response<Full<Bytes>> {
    error_response(&GatewayError::invalid("body", message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::PermissionDenied), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_failure_is_500() {
        let response = error_response(&GatewayError::FailedToParse("critique".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
