//! Caller-facing error taxonomy.
//!
//! Every gateway failure maps onto one of four wire kinds. Parse failures are
//! reported as `internal` and never carry the raw model reply.

use serde::{Deserialize, Serialize};
use std::fmt;

use signal_store::StoreError;

/// Wire error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Unauthenticated,
    PermissionDenied,
    InvalidArgument,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied => "permission-denied",
            Self::InvalidArgument => "invalid-argument",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for gateway operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// No caller identity, or the token did not verify
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Identity present but profile missing or role not authorized
    #[error("{0}")]
    PermissionDenied(String),

    /// Payload missing or invalid
    #[error("Invalid {field}: {message}")]
    InvalidArgument { field: String, message: String },

    /// Model reply could not be turned into the required structure
    #[error("Failed to parse {0}")]
    FailedToParse(String),

    /// Model, transcription or store failure, or timeout
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::invalid(field, "is required")
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::FailedToParse(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The `{kind, message}` body sent to callers.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_reports_internal() {
        let err = GatewayError::FailedToParse("vision suggestions".into());
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "Failed to parse vision suggestions");
    }

    #[test]
    fn test_invalid_argument_names_field() {
        let body = GatewayError::missing("problemStatement").to_body();
        assert_eq!(body.kind, ErrorKind::InvalidArgument);
        assert!(body.message.contains("problemStatement"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "invalid-argument");
    }
}
