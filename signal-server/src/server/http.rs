//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Request bodies are
//! bounded by `--max-body-bytes` since audio arrives inline as base64.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::header::AUTHORIZATION;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use signal_gateway::{extract_token_from_header, EnrichmentService};
use signal_store::DocumentStore;

use crate::config::Args;
use crate::routes::{self, bad_request_response, not_found_response, preflight_response};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub service: Arc<EnrichmentService>,
    pub store: Arc<dyn DocumentStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, service: Arc<EnrichmentService>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            args,
            service,
            store,
            started_at: Instant::now(),
        }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Signal listening on {}", state.args.listen);
    if state.args.dev_mode {
        warn!("Development mode enabled - mock backends and in-memory store may be in use");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move {
                            debug!(%addr, method = %req.method(), path = %req.uri().path(), "Request");
                            handle_request(state, req).await
                        }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// Route a request to its handler
pub async fn handle_request<B>(
    state: Arc<AppState>,
    req: Request<B>,
) -> Result<Response<BoxBody>, Infallible>
where
    B: Body<Data = Bytes> + Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let token = extract_token_from_header(
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    )
    .map(str::to_string);
    let token = token.as_deref();

    if method == Method::OPTIONS {
        return Ok(to_boxed(preflight_response()));
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let response = match (&method, segments.as_slice()) {
        (&Method::GET, ["health"]) => routes::health_check(&state).await,

        (&Method::POST, ["rpc", operation]) => {
            let body = match read_body(req, state.args.gateway.max_body_bytes).await {
                Ok(body) => body,
                Err(message) => return Ok(to_boxed(bad_request_response(&message))),
            };
            routes::handle_rpc(&state, operation, token, body).await
        }

        (&Method::GET, ["api", "related", kind, id]) => {
            routes::related_view(&state, token, kind, id).await
        }
        (&Method::GET, ["api", "metrics", "focus-areas", id]) => {
            routes::focus_area_metrics_view(&state, token, id).await
        }
        (&Method::GET, ["api", "metrics", "archetypes", id]) => {
            routes::archetype_metrics_view(&state, token, id).await
        }
        (&Method::GET, ["api", "alignment"]) => routes::alignment_view(&state, token).await,
        (&Method::GET, ["api", "health-summary"]) => {
            routes::health_summary_view(&state, token).await
        }
        (&Method::GET, ["api", "usage"]) => {
            routes::usage_view(&state, token, query.as_deref()).await
        }

        _ => not_found_response(&path),
    };

    Ok(to_boxed(response))
}

async fn read_body<B>(req: Request<B>, limit: usize) -> Result<Bytes, String>
where
    B: Body<Data = Bytes> + Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    Limited::new(req.into_body(), limit)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| format!("Failed to read request body: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use hyper::StatusCode;
    use serde_json::Value;

    use signal_gateway::backend::MockBackend;
    use signal_gateway::speech::MockTranscriber;
    use signal_gateway::JwtVerifier;
    use signal_model::{FocusArea, Hypothesis, UserProfile, UserRole};
    use signal_store::{add_record, Collection, MemoryStore};

    struct Fixture {
        state: Arc<AppState>,
        verifier: JwtVerifier,
    }

    async fn fixture(reply: &str) -> Fixture {
        let args = Args::try_parse_from(["signal-server", "--dev-mode"]).unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        for (id, role) in [
            ("pm", UserRole::ProductManager),
            ("admin", UserRole::Admin),
            ("exec", UserRole::Leadership),
        ] {
            add_record(
                store.as_ref(),
                Collection::Users,
                &UserProfile {
                    id: id.into(),
                    display_name: id.into(),
                    email: format!("{}@example.com", id),
                    role,
                },
            )
            .await
            .unwrap();
        }

        let verifier = JwtVerifier::new_dev();
        let service = EnrichmentService::new(
            Arc::new(MockBackend::new("test-model").with_response(reply)),
            Arc::new(MockTranscriber::new("hello")),
            store.clone(),
            Arc::new(JwtVerifier::new_dev()),
        );
        Fixture {
            state: Arc::new(AppState::new(args, Arc::new(service), store)),
            verifier,
        }
    }

    fn request(method: Method, path: &str, token: Option<&str>, body: &str) -> Request<Full<Bytes>> {
        let mut req = Request::new(Full::new(Bytes::from(body.to_string())));
        *req.method_mut() = method;
        *req.uri_mut() = path.parse().unwrap();
        if let Some(token) = token {
            req.headers_mut()
                .insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        }
        req
    }

    async fn send(f: &Fixture, req: Request<Full<Bytes>>) -> (StatusCode, Value) {
        let response = handle_request(Arc::clone(&f.state), req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let f = fixture("{}").await;
        let (status, body) = send(&f, request(Method::GET, "/health", None, "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let f = fixture("{}").await;
        let (status, _) = send(&f, request(Method::GET, "/nowhere", None, "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&f, request(Method::POST, "/rpc/make-coffee", None, "{}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rpc_maps_auth_errors() {
        let f = fixture("{}").await;
        let (status, body) =
            send(&f, request(Method::POST, "/rpc/generate-vision", None, "{}")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "unauthenticated");

        let exec = f.verifier.issue("exec").unwrap();
        let (status, body) = send(
            &f,
            request(Method::POST, "/rpc/generate-vision", Some(&exec), "{}"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["kind"], "permission-denied");
    }

    #[tokio::test]
    async fn test_rpc_runs_enrichment() {
        let f = fixture(r#"{"suggestions": ["Make onboarding effortless"]}"#).await;
        let pm = f.verifier.issue("pm").unwrap();
        let (status, body) = send(
            &f,
            request(Method::POST, "/rpc/generate-vision", Some(&pm), ""),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suggestions"][0], "Make onboarding effortless");
    }

    #[tokio::test]
    async fn test_rpc_rejects_malformed_json() {
        let f = fixture("{}").await;
        let pm = f.verifier.issue("pm").unwrap();
        let (status, body) = send(
            &f,
            request(Method::POST, "/rpc/rewrite-problem-statement", Some(&pm), "{not json"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid-argument");
    }

    #[tokio::test]
    async fn test_views_allow_leadership() {
        let f = fixture("{}").await;
        let exec = f.verifier.issue("exec").unwrap();
        let (status, body) =
            send(&f, request(Method::GET, "/api/health-summary", Some(&exec), "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["validationRate"], 0);

        let (status, _) = send(&f, request(Method::GET, "/api/alignment", None, "")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_related_view() {
        let f = fixture("{}").await;
        let store = f.state.store.as_ref();
        add_record(store, Collection::FocusAreas, &FocusArea::new("fa-1", "Onboarding"))
            .await
            .unwrap();
        let hypothesis = Hypothesis {
            focus_area_id: Some("fa-1".into()),
            ..Hypothesis::new("h-1", "Teams want templates")
        };
        add_record(store, Collection::Hypotheses, &hypothesis)
            .await
            .unwrap();

        let exec = f.verifier.issue("exec").unwrap();
        let (status, body) = send(
            &f,
            request(Method::GET, "/api/related/focus-area/fa-1", Some(&exec), ""),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["kind"], "hypothesis");
        assert_eq!(body[0]["title"], "Teams want templates");

        let (status, _) = send(
            &f,
            request(Method::GET, "/api/related/widget/fa-1", Some(&exec), ""),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_for_unknown_subject_is_404() {
        let f = fixture("{}").await;
        let pm = f.verifier.issue("pm").unwrap();
        let (status, _) = send(
            &f,
            request(Method::GET, "/api/metrics/archetypes/missing", Some(&pm), ""),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_usage_is_admin_only() {
        let f = fixture(r#"{"suggestions": []}"#).await;
        let pm = f.verifier.issue("pm").unwrap();
        send(&f, request(Method::POST, "/rpc/generate-vision", Some(&pm), "{}")).await;

        let (status, _) = send(&f, request(Method::GET, "/api/usage", Some(&pm), "")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = f.verifier.issue("admin").unwrap();
        let (status, body) = send(
            &f,
            request(Method::GET, "/api/usage?limit=5", Some(&admin), ""),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["totalInvocations"], 1);
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preflight() {
        let f = fixture("{}").await;
        let response = handle_request(
            Arc::clone(&f.state),
            request(Method::OPTIONS, "/rpc/generate-vision", None, ""),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }
}
