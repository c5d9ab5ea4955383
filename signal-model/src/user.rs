//! User profiles and roles.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Workspace role stored on the user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including usage reporting
    Admin,
    /// Authors and edits workspace content
    ProductManager,
    /// Read-only dashboards
    Leadership,
}

impl UserRole {
    /// Roles allowed to author content and invoke enrichment.
    pub const EDITORS: &'static [UserRole] = &[UserRole::Admin, UserRole::ProductManager];

    /// Every role; used for read-only views.
    pub const ANY: &'static [UserRole] = &[
        UserRole::Admin,
        UserRole::ProductManager,
        UserRole::Leadership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ProductManager => "product_manager",
            Self::Leadership => "leadership",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile document in the `users` collection, keyed by the identity subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    pub role: UserRole,
}
