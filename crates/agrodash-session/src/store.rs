//! The session store: one write path, two copies.
//!
//! Every session lives twice, once in the [`CookieJar`] (so the route guard
//! at the HTTP boundary can see the token) and once in [`LocalStorage`] (so
//! the pages can read the profile without parsing cookies). The store is
//! the ONLY code that writes either copy, and it always writes or clears
//! both in the same call.
//!
//! # Concurrency note
//!
//! `SessionStore` is not thread-safe by itself; methods take `&mut self`.
//! [`SessionContext`](crate::SessionContext) wraps it in a mutex so each
//! read or write happens inside one critical section and no reader can see
//! the copies disagree mid-write.

use std::sync::Arc;

use agrodash_protocol::{Codec, JsonCodec, UserProfile};

use crate::{
    Clock, CookieJar, KeyValueStore, LocalStorage, Session, SessionError, StoreConfig,
};

/// Owns the persisted copies of the current session.
///
/// ## Lifecycle
///
/// ```text
/// login ──→ write() ──→ read()/load() on every mount ──→ clear()
///                                │                         ↑
///                                └── invalid (expired, ────┘
///                                    partial, malformed)
/// ```
#[derive(Debug)]
pub struct SessionStore {
    cookies: CookieJar,
    local: LocalStorage,
    config: StoreConfig,
    codec: JsonCodec,
}

impl SessionStore {
    /// Creates an empty store whose cookie copy expires against `clock`.
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cookies: CookieJar::new(clock),
            local: LocalStorage::new(),
            config,
            codec: JsonCodec,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Persists the session to both copies.
    ///
    /// The profile is encoded once and the same string goes into both
    /// copies, so a later [`load`](Self::load) can compare them byte for
    /// byte.
    ///
    /// # Errors
    /// - [`SessionError::Partial`] if the token is empty (nothing is
    ///   written in that case)
    /// - [`SessionError::Encode`] if the profile cannot be serialized
    pub fn write(&mut self, session: &Session) -> Result<(), SessionError> {
        if session.token.is_empty() {
            return Err(SessionError::Partial("refusing to store an empty token"));
        }
        let blob = self
            .codec
            .encode(&session.profile)
            .map_err(SessionError::Encode)?;

        let max_age = self.config.cookie_max_age_secs;
        self.cookies
            .set_with_max_age(&self.config.token_key, session.token.clone(), max_age);
        self.cookies
            .set_with_max_age(&self.config.user_key, blob.clone(), max_age);
        self.local.set(&self.config.token_key, session.token.clone());
        self.local.set(&self.config.user_key, blob);

        tracing::debug!(
            user_id = %session.profile.id,
            role = %session.profile.role,
            "session written"
        );
        Ok(())
    }

    /// Reads the session, explaining why when there isn't a usable one.
    ///
    /// # Errors
    /// - [`SessionError::Missing`]: neither copy holds anything
    /// - [`SessionError::Partial`]: a key is missing from one copy, the
    ///   copies disagree, or the token is empty
    /// - [`SessionError::MalformedProfile`]: the `user` blob doesn't decode
    pub fn load(&self) -> Result<Session, SessionError> {
        let token_key = &self.config.token_key;
        let user_key = &self.config.user_key;

        let cookie_token = self.cookies.get(token_key);
        let cookie_user = self.cookies.get(user_key);
        let local_token = self.local.get(token_key);
        let local_user = self.local.get(user_key);

        if cookie_token.is_none()
            && cookie_user.is_none()
            && local_token.is_none()
            && local_user.is_none()
        {
            return Err(SessionError::Missing);
        }

        let (Some(token), Some(user)) = (cookie_token, cookie_user) else {
            return Err(SessionError::Partial("cookie copy is incomplete"));
        };
        if local_token.as_deref() != Some(token.as_str())
            || local_user.as_deref() != Some(user.as_str())
        {
            return Err(SessionError::Partial("cookie and local copies disagree"));
        }
        if token.is_empty() {
            return Err(SessionError::Partial("stored token is empty"));
        }

        let profile: UserProfile = self
            .codec
            .decode(&user)
            .map_err(SessionError::MalformedProfile)?;

        Ok(Session { token, profile })
    }

    /// Returns the session if both copies hold a complete, decodable one.
    ///
    /// Never panics and never errors: anything short of a full session is
    /// `None`.
    pub fn read(&self) -> Option<Session> {
        self.load().ok()
    }

    /// Removes both keys from both copies. Safe to call on an empty store.
    pub fn clear(&mut self) {
        for key in [&self.config.token_key, &self.config.user_key] {
            self.cookies.remove(key);
            self.local.remove(key);
        }
    }

    /// The token as the cookie copy currently holds it.
    pub fn token_cookie(&self) -> Option<String> {
        self.cookies.get(&self.config.token_key)
    }

    /// Read access to the cookie copy.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Raw access to the cookie copy, bypassing the paired write path.
    ///
    /// Exists for simulating what a browser (or a user poking at dev tools)
    /// can do to one copy behind the application's back.
    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    /// Read access to the local-storage copy.
    pub fn local(&self) -> &LocalStorage {
        &self.local
    }

    /// Raw access to the local-storage copy, bypassing the paired write
    /// path. See [`cookies_mut`](Self::cookies_mut).
    pub fn local_mut(&mut self) -> &mut LocalStorage {
        &mut self.local
    }
}
