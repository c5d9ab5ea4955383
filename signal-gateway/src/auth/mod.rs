//! Caller authentication and role authorization.

pub mod gate;
pub mod jwt;

pub use gate::{AuthGate, Caller};
pub use jwt::{extract_token_from_header, AuthError, Claims, JwtVerifier, TokenVerifier};
