//! Key-value substrates the session is persisted into.
//!
//! A browser gives a dashboard two places to keep string data: cookies
//! (sent with every request, can carry an expiry) and local storage (never
//! sent, never expires on its own). The session store writes to BOTH, so
//! both are modelled here behind one small trait.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::Clock;

/// Plain string key-value storage.
pub trait KeyValueStore: Send {
    /// Returns the value for `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);

    /// Removes `key`. Removing a missing key is a no-op.
    fn remove(&mut self, key: &str);
}

// ---------------------------------------------------------------------------
// CookieJar
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq)]
struct CookieEntry {
    value: String,
    /// Absolute Unix seconds; `None` for a session cookie.
    expires_at: Option<u64>,
}

/// The cookie copy.
///
/// Entries may carry an expiry. An entry whose expiry is at or before the
/// clock's "now" is invisible to [`get`](KeyValueStore::get), exactly as a
/// browser stops sending a cookie once its `Expires` has passed.
pub struct CookieJar {
    entries: BTreeMap<String, CookieEntry>,
    clock: Arc<dyn Clock>,
}

impl CookieJar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: BTreeMap::new(),
            clock,
        }
    }

    /// Stores a cookie that expires `max_age_secs` from now.
    pub fn set_with_max_age(&mut self, key: &str, value: String, max_age_secs: u64) {
        let expires_at = self.clock.now_unix().saturating_add(max_age_secs);
        self.entries.insert(
            key.to_string(),
            CookieEntry {
                value,
                expires_at: Some(expires_at),
            },
        );
    }

    /// Returns the expiry of a live cookie, if it has one.
    pub fn expires_at(&self, key: &str) -> Option<u64> {
        self.live(key).and_then(|entry| entry.expires_at)
    }

    /// Renders the live cookies as a `Cookie` request header value.
    ///
    /// Values are percent-encoded the way client-side cookie libraries do,
    /// so a JSON profile containing `;` cannot split the header. Returns
    /// `None` when no cookie is live.
    pub fn header_value(&self) -> Option<String> {
        let now = self.clock.now_unix();
        let pairs: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| is_live(entry, now))
            .map(|(name, entry)| format!("{name}={}", urlencoding::encode(&entry.value)))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    fn live(&self, key: &str) -> Option<&CookieEntry> {
        let now = self.clock.now_unix();
        self.entries.get(key).filter(|entry| is_live(entry, now))
    }
}

fn is_live(entry: &CookieEntry, now: u64) -> bool {
    entry.expires_at.is_none_or(|at| at > now)
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        self.live(key).map(|entry| entry.value.clone())
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(
            key.to_string(),
            CookieEntry {
                value,
                expires_at: None,
            },
        );
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

// Only key names are printed: the values are bearer tokens and profiles.
impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// LocalStorage
// ---------------------------------------------------------------------------

/// The local-storage copy. No expiry of any kind; entries live until
/// removed.
#[derive(Default, Clone)]
pub struct LocalStorage {
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

impl fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorage")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
