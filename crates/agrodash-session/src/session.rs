//! The session value and where it is stored.
//!
//! A "session" is the client's picture of the logged-in user: the opaque
//! bearer token the authentication service issued, plus the cached profile
//! (id, email, name, role, center affiliations). It is either fully present
//! or fully absent; the store never hands out half of one.

use std::fmt;

use agrodash_protocol::{Role, UserProfile};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Storage keys and cookie lifetime.
///
/// The defaults match what the dashboard front end has always used:
/// `token` and `user`, with the cookie copy living one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key holding the bearer token.
    pub token_key: String,

    /// Key holding the JSON-encoded [`UserProfile`].
    pub user_key: String,

    /// Lifetime of the cookie copy, in seconds. The local-storage copy has
    /// no expiry; only the token validator invalidates it.
    pub cookie_max_age_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
            user_key: "user".to_string(),
            cookie_max_age_secs: 24 * 60 * 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated user's identity and entitlements.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token (a JWT in practice).
    pub token: String,

    /// The cached profile written next to the token.
    pub profile: UserProfile,
}

impl Session {
    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn user_id(&self) -> &str {
        &self.profile.id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default_keys() {
        let config = StoreConfig::default();
        assert_eq!(config.token_key, "token");
        assert_eq!(config.user_key, "user");
        assert_eq!(config.cookie_max_age_secs, 86_400);
    }

    #[test]
    fn test_store_config_partial_json_fills_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"cookie_max_age_secs":60}"#).unwrap();
        assert_eq!(config.cookie_max_age_secs, 60);
        assert_eq!(config.token_key, "token");
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session {
            token: "eyJhbGciOi.secret.sig".into(),
            profile: UserProfile {
                id: "9".into(),
                email: "n@x.io".into(),
                name: "N".into(),
                role: Role::Manager,
                centers: None,
            },
        };
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("Manager"));
        assert_eq!(session.role(), Role::Manager);
        assert_eq!(session.user_id(), "9");
    }
}
