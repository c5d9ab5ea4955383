//! Bearer token verification.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the user id. The role is not
//! carried in the token; it is read from the user's profile document.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Error types for token handling.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token expired")]
    Expired,

    #[error("{0}")]
    InvalidToken(String),
}

/// Resolves a bearer token to a user id.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// Payload stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// HS256 JWT verifier and issuer
#[derive(Clone)]
pub struct JwtVerifier {
    secret: String,
    expiry_seconds: u64,
}

impl JwtVerifier {
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Config("JWT_SECRET is required".into()));
        }

        if secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".into(),
            ));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Verifier for dev mode with a fixed secret
    pub fn new_dev() -> Self {
        Self {
            secret: "dev-mode-secret-not-for-production-use-123456".into(),
            expiry_seconds: 3600,
        }
    }

    /// Issue a token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AuthError::Config(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(format!("Failed to generate token: {}", e)))
    }

    /// Verify and decode a token
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidToken("Invalid signature".into()),
                _ => AuthError::InvalidToken("Invalid token".into()),
            }
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        let claims = self.decode(token)?;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("Token has no subject".into()));
        }
        Ok(claims.sub)
    }
}

/// Extract token from Authorization header.
/// Supports "Bearer <token>" format and raw tokens.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    if !header.contains(' ') {
        let token = header.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_verifier() -> JwtVerifier {
        JwtVerifier::new(
            "test-secret-that-is-at-least-32-characters-long".into(),
            3600,
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let verifier = test_verifier();
        let token = verifier.issue("user-123").unwrap();
        assert_eq!(verifier.verify(&token).unwrap(), "user-123");
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            test_verifier().verify("invalid-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let other = JwtVerifier::new(
            "different-secret-that-is-at-least-32-characters".into(),
            3600,
        )
        .unwrap();
        let token = test_verifier().issue("user-123").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_secret_validation() {
        assert!(JwtVerifier::new("short".into(), 3600).is_err());
        assert!(JwtVerifier::new("".into(), 3600).is_err());
        assert!(JwtVerifier::new("this-secret-is-at-least-32-chars-long".into(), 3600).is_ok());
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_token_from_header(Some("abc123")), Some("abc123"));
        assert_eq!(extract_token_from_header(None), None);
        assert_eq!(extract_token_from_header(Some("")), None);
        assert_eq!(extract_token_from_header(Some("Bearer ")), None);
        assert_eq!(extract_token_from_header(Some("Basic abc123")), None);
    }
}
