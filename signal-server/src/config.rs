//! Configuration for the Signal server
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use signal_gateway::auth::AuthError;
use signal_gateway::{GatewayConfig, JwtVerifier};

/// Signal - AI enrichment gateway and alignment views
#[derive(Parser, Debug, Clone)]
#[command(name = "signal-server")]
#[command(about = "AI enrichment gateway and alignment views for the Signal workspace")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store and mock models allowed)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "signal")]
    pub mongodb_db: String,

    /// JWT secret for token verification (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Model provider configuration
    #[command(flatten)]
    pub model: ModelArgs,

    /// Gateway tuning
    #[command(flatten)]
    pub gateway: GatewayArgs,
}

/// Text model and speech-to-text providers
#[derive(Parser, Debug, Clone)]
pub struct ModelArgs {
    /// Anthropic API key (required in production)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// Anthropic model id
    #[arg(long, env = "ANTHROPIC_MODEL", default_value = "claude-sonnet-4-5")]
    pub anthropic_model: String,

    /// Anthropic API base URL
    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = "https://api.anthropic.com")]
    pub anthropic_base_url: String,

    /// Speech-to-text API key (required in production)
    #[arg(long, env = "WHISPER_API_KEY", hide_env_values = true)]
    pub whisper_api_key: Option<String>,

    /// Speech-to-text model id
    #[arg(long, env = "WHISPER_MODEL", default_value = "whisper-1")]
    pub whisper_model: String,

    /// Speech-to-text API base URL
    #[arg(long, env = "WHISPER_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub whisper_base_url: String,
}

/// Timeouts and bounds for enrichment operations
#[derive(Parser, Debug, Clone)]
pub struct GatewayArgs {
    /// Timeout for light text operations, in seconds
    #[arg(long, env = "LIGHT_TIMEOUT_SECS", default_value = "120")]
    pub light_timeout_secs: u64,

    /// Timeout for heavy generation operations, in seconds
    #[arg(long, env = "HEAVY_TIMEOUT_SECS", default_value = "300")]
    pub heavy_timeout_secs: u64,

    /// Timeout for audio transcription, in seconds
    #[arg(long, env = "TRANSCRIPTION_TIMEOUT_SECS", default_value = "540")]
    pub transcription_timeout_secs: u64,

    /// Tool-use rounds allowed during web research
    #[arg(long, env = "RESEARCH_MAX_ITERATIONS", default_value = "4")]
    pub research_max_iterations: u32,

    /// Wall-clock bound on web research, in seconds
    #[arg(long, env = "RESEARCH_TIMEOUT_SECS", default_value = "90")]
    pub research_timeout_secs: u64,

    /// Sampling temperature (0.0-1.0)
    #[arg(long, env = "MODEL_TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// Invocations kept in the usage log
    #[arg(long, env = "USAGE_LOG_CAPACITY", default_value = "1000")]
    pub usage_log_capacity: usize,

    /// Maximum request body size in bytes (audio uploads are base64 JSON)
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "41943040")]
    pub max_body_bytes: usize,
}

impl Args {
    /// Token verifier; dev mode falls back to a fixed secret.
    pub fn jwt_verifier(&self) -> Result<JwtVerifier, AuthError> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => JwtVerifier::new(secret.clone(), self.jwt_expiry_seconds),
            (None, true) => Ok(JwtVerifier::new_dev()),
            (None, false) => Err(AuthError::Config(
                "JWT_SECRET is required in production mode".into(),
            )),
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        let g = &self.gateway;
        GatewayConfig {
            light_timeout: Duration::from_secs(g.light_timeout_secs),
            heavy_timeout: Duration::from_secs(g.heavy_timeout_secs),
            transcription_timeout: Duration::from_secs(g.transcription_timeout_secs),
            research_max_iterations: g.research_max_iterations,
            research_timeout: Duration::from_secs(g.research_timeout_secs),
            temperature: g.temperature,
            usage_log_capacity: g.usage_log_capacity,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            if self.jwt_secret.is_none() {
                return Err("JWT_SECRET is required in production mode".to_string());
            }
            if self.model.anthropic_api_key.is_none() {
                return Err("ANTHROPIC_API_KEY is required in production mode".to_string());
            }
            if self.model.whisper_api_key.is_none() {
                return Err("WHISPER_API_KEY is required in production mode".to_string());
            }
        }

        let g = &self.gateway;
        if g.light_timeout_secs == 0 || g.heavy_timeout_secs == 0 || g.transcription_timeout_secs == 0
        {
            return Err("Timeouts must be greater than zero".to_string());
        }
        if g.research_max_iterations == 0 {
            return Err("RESEARCH_MAX_ITERATIONS must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&g.temperature) {
            return Err("MODEL_TEMPERATURE must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["signal-server"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_match_gateway_defaults() {
        let args = parse(&["--dev-mode"]);
        let config = args.gateway_config();
        let defaults = GatewayConfig::default();
        assert_eq!(config.light_timeout, defaults.light_timeout);
        assert_eq!(config.heavy_timeout, defaults.heavy_timeout);
        assert_eq!(config.transcription_timeout, defaults.transcription_timeout);
        assert_eq!(config.research_max_iterations, 4);
        assert_eq!(config.research_timeout.as_secs(), 90);
    }

    #[test]
    fn test_production_requires_secrets() {
        let args = parse(&[]);
        assert!(args.validate().unwrap_err().contains("JWT_SECRET"));
        assert!(args.jwt_verifier().is_err());

        let args = parse(&[
            "--jwt-secret",
            "a-production-secret-that-is-long-enough",
            "--anthropic-api-key",
            "sk-ant",
        ]);
        assert!(args.validate().unwrap_err().contains("WHISPER_API_KEY"));
    }

    #[test]
    fn test_dev_mode_allows_missing_secrets() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert!(args.jwt_verifier().is_ok());
    }

    #[test]
    fn test_rejects_bad_temperature() {
        let args = parse(&["--dev-mode", "--temperature", "1.5"]);
        assert!(args.validate().is_err());
    }
}
