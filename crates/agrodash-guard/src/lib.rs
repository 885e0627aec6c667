//! Route guard for Agrodash.
//!
//! The guard is the coarse, outer check on every navigation. It only asks
//! "is there a token at all?". Expiry and role are checked later, inside
//! the rendered page, by the session and access layers:
//!
//! ```text
//! request ──► RouteGuard::authorize ──► page mounts ──► require_session
//!               (token present?)                        (token valid?)
//!                     │                                       │
//!                     └─ no ──► /login          invalid ──► /login
//! ```
//!
//! # Feature Flags
//!
//! - `axum` (default): [`layer::enforce`], a middleware applying the guard
//!   to an axum router, and header helpers in [`cookie`].

#[cfg(feature = "axum")]
pub mod cookie;
#[cfg(feature = "axum")]
pub mod layer;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

/// Paths and cookie name the guard works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Where unauthenticated requests are sent.
    pub login_path: String,

    /// Everything at or below this path needs a token.
    pub protected_prefix: String,

    /// Where a request for the bare prefix lands. The same for every role.
    pub default_landing: String,

    /// Name of the cookie carrying the token.
    pub token_cookie: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".into(),
            protected_prefix: "/dashboard".into(),
            default_landing: "/dashboard/orders".into(),
            token_cookie: "token".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GuardDecision
// ---------------------------------------------------------------------------

/// What the guard wants done with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through.
    Allow,
    /// Send the client to this path instead.
    RedirectTo(String),
}

// ---------------------------------------------------------------------------
// RouteGuard
// ---------------------------------------------------------------------------

/// Token-presence check for protected paths.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    config: GuardConfig,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Decides what to do with a request for `path` carrying `token`.
    ///
    /// 1. Outside the protected prefix → [`GuardDecision::Allow`]
    /// 2. No token, or an empty one → redirect to the login path
    /// 3. The bare prefix (`/dashboard` or `/dashboard/`) → redirect to the
    ///    default landing page
    /// 4. Otherwise → [`GuardDecision::Allow`]
    ///
    /// The token's contents are never looked at.
    pub fn authorize(&self, path: &str, token: Option<&str>) -> GuardDecision {
        let Some(rest) = self.protected_remainder(path) else {
            return GuardDecision::Allow;
        };

        if token.is_none_or(str::is_empty) {
            tracing::debug!(path, "no token, redirecting to login");
            return GuardDecision::RedirectTo(self.config.login_path.clone());
        }

        if rest.is_empty() || rest == "/" {
            return GuardDecision::RedirectTo(self.config.default_landing.clone());
        }

        GuardDecision::Allow
    }

    /// Whether `path` is at or below the protected prefix.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_remainder(path).is_some()
    }

    /// The part of `path` after the protected prefix, if `path` is under
    /// it. `/dashboardx` is not under `/dashboard`.
    fn protected_remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        let prefix = self.config.protected_prefix.trim_end_matches('/');
        let rest = path.strip_prefix(prefix)?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}
