//! The authorization gate every gateway operation passes through first.

use std::sync::Arc;
use tracing::{debug, warn};

use signal_model::{UserProfile, UserRole};
use signal_store::{get_typed, Collection, DocumentStore};

use super::jwt::TokenVerifier;
use crate::error::GatewayError;

/// An authorized caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: UserRole,
}

/// Checks a bearer token and the caller's profile role.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
    store: Arc<dyn DocumentStore>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>, store: Arc<dyn DocumentStore>) -> Self {
        Self { verifier, store }
    }

    /// Resolve `token` to a caller whose role is in `roles`.
    ///
    /// - no token, or a token that does not verify: `Unauthenticated`
    /// - no profile, or a role outside `roles`: `PermissionDenied`
    /// - profile read failure: `Internal`
    pub async fn require(
        &self,
        token: Option<&str>,
        roles: &[UserRole],
    ) -> Result<Caller, GatewayError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::Unauthenticated("missing bearer token".into()))?;

        let user_id = self.verifier.verify(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            GatewayError::Unauthenticated(e.to_string())
        })?;

        let profile: Option<UserProfile> =
            match get_typed(self.store.as_ref(), Collection::Users, &user_id).await {
                Ok(profile) => profile,
                Err(signal_store::StoreError::Serialization(e)) => {
                    warn!(%user_id, error = %e, "Malformed user profile");
                    None
                }
                Err(e) => return Err(e.into()),
            };

        let profile = profile.ok_or_else(|| {
            GatewayError::PermissionDenied(format!("No profile for user {}", user_id))
        })?;

        if !roles.contains(&profile.role) {
            return Err(GatewayError::PermissionDenied(format!(
                "Role {} is not allowed to perform this operation",
                profile.role
            )));
        }

        Ok(Caller {
            user_id,
            role: profile.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtVerifier;
    use crate::error::ErrorKind;
    use serde_json::json;
    use signal_store::MemoryStore;

    async fn setup() -> (AuthGate, JwtVerifier) {
        let store = MemoryStore::new();
        store
            .add(Collection::Users, json!({ "id": "pm-1", "role": "product_manager" }))
            .await
            .unwrap();
        store
            .add(Collection::Users, json!({ "id": "lead-1", "role": "leadership" }))
            .await
            .unwrap();
        let verifier = JwtVerifier::new_dev();
        let gate = AuthGate::new(Arc::new(verifier.clone()), Arc::new(store));
        (gate, verifier)
    }

    #[tokio::test]
    async fn test_editor_passes() {
        let (gate, verifier) = setup().await;
        let token = verifier.issue("pm-1").unwrap();
        let caller = gate.require(Some(&token), UserRole::EDITORS).await.unwrap();
        assert_eq!(caller.role, UserRole::ProductManager);
    }

    #[tokio::test]
    async fn test_failures_map_to_kinds() {
        let (gate, verifier) = setup().await;

        let err = gate.require(None, UserRole::EDITORS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        let err = gate.require(Some("garbage"), UserRole::EDITORS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        let lead = verifier.issue("lead-1").unwrap();
        let err = gate.require(Some(&lead), UserRole::EDITORS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(gate.require(Some(&lead), UserRole::ANY).await.is_ok());

        let stranger = verifier.issue("nobody").unwrap();
        let err = gate.require(Some(&stranger), UserRole::ANY).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }
}
