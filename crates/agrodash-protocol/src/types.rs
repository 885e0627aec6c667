//! Data shapes exchanged with the authentication service and persisted in
//! the session store.

use serde::{Deserialize, Serialize};

use crate::Role;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A facility the user is affiliated with (a collection or distribution
/// center). Users scoped to centers only see data for those centers; the
/// scoping itself happens in the data pages, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Center {
    pub id: String,
    pub name: String,
}

/// The cached user profile, stored as JSON under the `user` key.
///
/// `centers` is `None` for users with no facility scoping. It is skipped
/// when serializing a `None`, so a profile written and read back compares
/// equal to the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user identifier issued by the authentication service.
    pub id: String,
    pub email: String,
    /// Display name shown in the dashboard header.
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centers: Option<Vec<Center>>,
}

// ---------------------------------------------------------------------------
// Authentication service bodies
// ---------------------------------------------------------------------------

/// Login request body.
///
/// `Debug` is implemented by hand so the password never lands in a log line.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login response body.
///
/// Every field is optional on the wire: a 2xx response without an
/// `access_token` is still a failed login, and the caller must be able to
/// tell that apart from a malformed body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Role lookup response body, keyed by user id on the service side.
///
/// `role` stays a raw string here; normalization into [`Role`] happens in
/// the session layer so a bad value surfaces as a login failure instead of
/// a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLookupResponse {
    pub role: String,
    #[serde(default)]
    pub centers: Option<Vec<Center>>,
}
