//! The application-scoped session context.
//!
//! There is exactly one `SessionContext` per running dashboard. It is
//! created at startup, handed (by reference or `Arc`) to whatever needs a
//! session, and mutated only through [`write`](SessionContext::write) and
//! [`clear`](SessionContext::clear). Nothing else reaches into the cookie
//! or local-storage copies.
//!
//! Every operation takes the store's lock exactly once, so each read,
//! write, or validate-then-clear is a single critical section.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    Clock, Session, SessionError, SessionStore, StoreConfig, SystemClock, TokenState,
    TokenValidator,
};

/// Shared handle to the current session.
#[derive(Debug)]
pub struct SessionContext {
    store: Mutex<SessionStore>,
    validator: TokenValidator,
}

impl SessionContext {
    /// Creates an empty context on the system clock.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty context on the given clock. The cookie copy's
    /// max-age and the validator's notion of "now" share it.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(SessionStore::new(config, Arc::clone(&clock))),
            validator: TokenValidator::new(clock),
        }
    }

    /// Returns the stored session, or `None` if there isn't a complete one.
    ///
    /// This does NOT check expiry. Pages that need a live session go
    /// through [`check`](Self::check).
    pub fn get_session(&self) -> Option<Session> {
        self.store.lock().read()
    }

    /// Persists a freshly established session to both copies.
    ///
    /// # Errors
    /// See [`SessionStore::write`].
    pub fn write(&self, session: &Session) -> Result<(), SessionError> {
        self.store.lock().write(session)
    }

    /// Removes the session from both copies.
    pub fn clear(&self) {
        self.store.lock().clear();
        tracing::debug!("session cleared");
    }

    /// Runs one validation pass.
    ///
    /// On INVALID the store is cleared before the lock is released, so no
    /// caller can observe an invalid session between the check and the
    /// logout.
    pub fn check(&self) -> TokenState {
        let mut store = self.store.lock();
        let state = self.validator.check(&store);
        if let TokenState::Invalid(_) = &state {
            store.clear();
        }
        state
    }

    /// The `Cookie` header a browser holding this session would send.
    pub fn cookie_header(&self) -> Option<String> {
        self.store.lock().cookies().header_value()
    }

    /// The token from the cookie copy, if live.
    pub fn token_cookie(&self) -> Option<String> {
        self.store.lock().token_cookie()
    }

    /// Runs `f` with exclusive access to the underlying store.
    ///
    /// For simulations and diagnostics; application code should stay on
    /// `write`/`clear`/`check`.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut SessionStore) -> R) -> R {
        f(&mut self.store.lock())
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use agrodash_protocol::{Role, UserProfile};
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;
    use crate::{KeyValueStore, ManualClock};

    const NOW: u64 = 1_700_000_000;

    /// Hand-built unsigned JWT; the validator ignores the signature.
    fn token_expiring_at(exp: u64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u-5","exp":{exp}}}"#));
        format!("{header}.{payload}.c2ln")
    }

    fn session(exp: u64) -> Session {
        Session {
            token: token_expiring_at(exp),
            profile: UserProfile {
                id: "u-5".into(),
                email: "otieno@example.com".into(),
                name: "Otieno".into(),
                role: Role::SalesAgent,
                centers: None,
            },
        }
    }

    fn context() -> (SessionContext, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NOW));
        (
            SessionContext::with_clock(StoreConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_check_expired_token_clears_store() {
        let (ctx, _) = context();
        ctx.write(&session(NOW - 5)).unwrap();

        let state = ctx.check();

        assert!(matches!(state, TokenState::Invalid(SessionError::Expired { .. })));
        assert!(ctx.get_session().is_none(), "read after forced logout is absent");
        assert!(ctx.with_store(|s| s.local().is_empty()));
    }

    #[test]
    fn test_check_valid_token_keeps_store() {
        let (ctx, _) = context();
        let written = session(NOW + 600);
        ctx.write(&written).unwrap();

        let state = ctx.check();

        assert!(state.is_valid());
        assert_eq!(ctx.get_session(), Some(written));
    }

    #[test]
    fn test_check_partial_session_clears_leftovers() {
        let (ctx, _) = context();
        ctx.with_store(|s| s.local_mut().set("user", "{}".into()));

        let state = ctx.check();

        assert!(matches!(state, TokenState::Invalid(SessionError::Partial(_))));
        assert!(ctx.with_store(|s| s.local().is_empty()));
    }

    #[test]
    fn test_get_session_does_not_check_expiry() {
        // Expiry is only evaluated on check(); reading between mounts
        // still sees the stale session.
        let (ctx, clock) = context();
        ctx.write(&session(NOW + 10)).unwrap();

        clock.advance(20);

        assert!(ctx.get_session().is_some());
        assert!(!ctx.check().is_valid());
        assert!(ctx.get_session().is_none());
    }

    #[test]
    fn test_cookie_header_contains_token() {
        let (ctx, _) = context();
        assert!(ctx.cookie_header().is_none());

        ctx.write(&session(NOW + 60)).unwrap();

        let header = ctx.cookie_header().unwrap();
        assert!(header.starts_with("token="));
        assert_eq!(ctx.token_cookie(), Some(token_expiring_at(NOW + 60)));
    }

    #[test]
    fn test_context_is_shareable_across_threads() {
        let (ctx, _) = context();
        let ctx = Arc::new(ctx);
        let written = session(NOW + 60);

        let writer = {
            let ctx = Arc::clone(&ctx);
            let written = written.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    ctx.write(&written).unwrap();
                    ctx.clear();
                }
                ctx.write(&written).unwrap();
            })
        };
        // Readers only ever see all-or-nothing.
        for _ in 0..100 {
            match ctx.with_store(|s| s.load()) {
                Ok(s) => assert_eq!(s, written),
                Err(SessionError::Missing) => {}
                Err(other) => panic!("reader observed a torn session: {other}"),
            }
        }
        writer.join().unwrap();

        assert_eq!(ctx.get_session(), Some(written));
    }
}
