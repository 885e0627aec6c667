//! The `Dashboard` application context.
//!
//! One `Dashboard` is built at startup and passed explicitly to everything
//! that renders a page. It owns the session context, the route guard, the
//! navigation table, and the authenticator, and exposes the handful of
//! operations pages are allowed to use:
//!
//! ```text
//! login ──► write ─────────────────────────────┐
//!                                              ▼
//! navigate(path) ──► guard ──► require_session ──► visible_navigation ──► Page
//!                      │            │
//!                      ▼            ▼
//!                   Redirect     Redirect (store cleared)
//! ```
//!
//! Expiry is checked when a page mounts, i.e. once per `navigate`. A token
//! that expires while a page is open stays in use until the next
//! navigation.

use std::sync::Arc;

use agrodash_access::{NavigationItem, NavigationTable};
use agrodash_guard::{GuardConfig, GuardDecision, RouteGuard};
use agrodash_protocol::{Credentials, Role, UserProfile};
use agrodash_session::{
    Authenticator, Clock, FailureKind, Session, SessionContext, SessionError, StoreConfig,
    SystemClock, TokenState,
};

use crate::DashboardConfig;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Instruction to send the user elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self { to: path.into() }
    }
}

/// A page that passed every check and can be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The requested path.
    pub path: String,
    /// The live session, or `None` on public pages such as login.
    pub session: Option<Session>,
    /// Menu entries for the session's role, in table order.
    pub navigation: Vec<NavigationItem>,
}

/// Result of one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Rendered(Page),
    Redirected(Redirect),
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The explicitly passed application context.
pub struct Dashboard<A: Authenticator> {
    context: SessionContext,
    guard: RouteGuard,
    navigation: NavigationTable,
    auth: A,
}

impl<A: Authenticator> Dashboard<A> {
    /// Builds a dashboard with default paths, storage keys, and menu.
    pub fn new(auth: A) -> Self {
        Self::from_parts(
            auth,
            SessionContext::new(StoreConfig::default()),
            RouteGuard::default(),
            NavigationTable::dashboard(),
        )
    }

    /// Builds a dashboard from loaded configuration on the system clock.
    pub fn from_config(auth: A, config: &DashboardConfig) -> Self {
        Self::with_clock(auth, config, Arc::new(SystemClock))
    }

    /// Like [`from_config`](Self::from_config) on the given clock.
    pub fn with_clock(auth: A, config: &DashboardConfig, clock: Arc<dyn Clock>) -> Self {
        let guard = GuardConfig {
            token_cookie: config.store.token_key.clone(),
            ..config.guard.clone()
        };
        Self::from_parts(
            auth,
            SessionContext::with_clock(config.store.clone(), clock),
            RouteGuard::new(guard),
            NavigationTable::dashboard(),
        )
    }

    /// Assembles a dashboard from prepared parts.
    pub fn from_parts(
        auth: A,
        context: SessionContext,
        guard: RouteGuard,
        navigation: NavigationTable,
    ) -> Self {
        Self {
            context,
            guard,
            navigation,
            auth,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn navigation(&self) -> &NavigationTable {
        &self.navigation
    }

    /// Logs in and stores the resulting session.
    ///
    /// Authenticates, looks up the role, normalizes it, then writes token
    /// and profile to both copies. A role the dashboard doesn't know is a
    /// failed login. Nothing is retried and nothing is stored on failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        let result = establish(&self.auth, credentials)
            .await
            .and_then(|session| self.context.write(&session).map(|()| session));
        match &result {
            Ok(session) => {
                tracing::info!(user_id = session.user_id(), role = %session.role(), "logged in");
            }
            Err(err) => {
                tracing::info!(email = %credentials.email, reason = %err, "login failed");
            }
        }
        result
    }

    /// The stored session, without an expiry check.
    pub fn get_session(&self) -> Option<Session> {
        self.context.get_session()
    }

    /// The mount-time check: validates the stored session once.
    ///
    /// On any failure the store has already been cleared and the caller
    /// gets a redirect to login.
    pub fn require_session(&self) -> Result<Session, Redirect> {
        match self.context.check() {
            TokenState::Valid(session) => Ok(session),
            TokenState::Invalid(err) => {
                match err.kind() {
                    FailureKind::MissingSession => {
                        tracing::debug!(reason = %err, "no session, redirecting to login");
                    }
                    FailureKind::ExpiredSession => {
                        tracing::info!(reason = %err, "session expired, logging out");
                    }
                    FailureKind::MalformedProfile | FailureKind::LoginFailed => {
                        tracing::warn!(reason = %err, "unusable session discarded");
                    }
                }
                Err(self.login_redirect())
            }
        }
    }

    /// Menu entries for `role`, in table order.
    pub fn visible_navigation(&self, role: Role) -> Vec<NavigationItem> {
        self.navigation
            .visible_for_role(role)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Clears the session and sends the user to login.
    pub fn logout(&self) -> Redirect {
        self.context.clear();
        tracing::info!("logged out");
        self.login_redirect()
    }

    /// Runs the full navigation pipeline for `path`.
    ///
    /// 1. The route guard looks at the token cookie only. When it turns a
    ///    protected page away for a missing token, whatever is left in local
    ///    storage is a partial session and gets cleared.
    /// 2. Protected pages then run [`require_session`](Self::require_session).
    /// 3. The menu is filtered by the session's role.
    pub fn navigate(&self, path: &str) -> NavigationOutcome {
        let token = self.context.token_cookie();
        if let GuardDecision::RedirectTo(to) = self.guard.authorize(path, token.as_deref()) {
            if token.as_deref().is_none_or(str::is_empty) {
                self.context.clear();
                tracing::info!(path, "token cookie gone, session cleared");
            }
            return NavigationOutcome::Redirected(Redirect::to(to));
        }

        if !self.guard.is_protected(path) {
            return NavigationOutcome::Rendered(Page {
                path: path.to_owned(),
                session: None,
                navigation: Vec::new(),
            });
        }

        match self.require_session() {
            Ok(session) => {
                let navigation = self.visible_navigation(session.role());
                NavigationOutcome::Rendered(Page {
                    path: path.to_owned(),
                    session: Some(session),
                    navigation,
                })
            }
            Err(redirect) => NavigationOutcome::Redirected(redirect),
        }
    }

    fn login_redirect(&self) -> Redirect {
        Redirect::to(self.guard.config().login_path.clone())
    }
}

/// Authenticates, looks up the role, and normalizes it into a session.
/// Nothing is stored.
pub(crate) async fn establish<A: Authenticator>(
    auth: &A,
    credentials: &Credentials,
) -> Result<Session, SessionError> {
    let grant = auth.authenticate(credentials).await?;
    let lookup = auth.lookup_role(&grant.user_id, &grant.token).await?;
    let role = Role::parse(&lookup.role)
        .ok_or_else(|| SessionError::AuthFailed(format!("unknown role {:?}", lookup.role)))?;

    Ok(Session {
        token: grant.token,
        profile: UserProfile {
            id: grant.user_id,
            email: credentials.email.clone(),
            name: grant.name.unwrap_or_default(),
            role,
            centers: lookup.centers,
        },
    })
}

impl<A: Authenticator + std::fmt::Debug> std::fmt::Debug for Dashboard<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("context", &self.context)
            .field("guard", &self.guard)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
