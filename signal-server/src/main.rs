//! Signal - AI enrichment gateway and alignment views

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signal_gateway::backend::MockBackend;
use signal_gateway::speech::MockTranscriber;
use signal_gateway::{AnthropicBackend, EnrichmentService, LlmBackend, SpeechToText, WhisperBackend};
use signal_server::{config::Args, server, AppState};
use signal_store::{DocumentStore, MemoryStore, MongoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("signal_server={0},signal_gateway={0},info", log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Signal - AI Enrichment Gateway");
    info!("======================================");
    info!("Listen address: {}", args.listen);
    info!("Dev mode: {}", args.dev_mode);
    info!("Model: {}", args.model.anthropic_model);
    info!("Transcription model: {}", args.model.whisper_model);

    let store: Arc<dyn DocumentStore> =
        match MongoStore::connect(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(mongo) => {
                info!("Connected to MongoDB at {}", args.mongodb_uri);
                Arc::new(mongo)
            }
            Err(e) if args.dev_mode => {
                warn!("MongoDB unavailable ({}), using in-memory store", e);
                Arc::new(MemoryStore::new())
            }
            Err(e) => {
                error!("Failed to connect to MongoDB: {}", e);
                return Err(e.into());
            }
        };

    let backend: Arc<dyn LlmBackend> = match &args.model.anthropic_api_key {
        Some(key) => Arc::new(AnthropicBackend::new(
            &args.model.anthropic_base_url,
            &args.model.anthropic_model,
            key,
        )?),
        None => {
            warn!("ANTHROPIC_API_KEY not set, using mock text model");
            Arc::new(MockBackend::new("mock").with_response(r#"{"suggestions": []}"#))
        }
    };

    let transcriber: Arc<dyn SpeechToText> = match &args.model.whisper_api_key {
        Some(key) => Arc::new(WhisperBackend::new(
            &args.model.whisper_base_url,
            &args.model.whisper_model,
            key,
        )?),
        None => {
            warn!("WHISPER_API_KEY not set, using mock transcriber");
            Arc::new(MockTranscriber::new(""))
        }
    };

    let verifier = Arc::new(args.jwt_verifier()?);
    let service = EnrichmentService::new(backend, transcriber, store.clone(), verifier)
        .with_config(args.gateway_config());

    let state = Arc::new(AppState::new(args, Arc::new(service), store));
    server::run(state).await
}
