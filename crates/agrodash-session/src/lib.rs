//! Session management for Agrodash.
//!
//! This crate owns everything the dashboard knows about "who is logged in":
//!
//! 1. **Storage**: the cookie copy and the local-storage copy of the
//!    token and profile ([`SessionStore`], [`CookieJar`], [`LocalStorage`])
//! 2. **Validation**: deciding whether a stored token is still usable
//!    ([`TokenValidator`], [`TokenState`])
//! 3. **Context**: the single, explicitly passed handle the rest of the
//!    application reads sessions through ([`SessionContext`])
//! 4. **Authentication**: the seam to the external service that issues
//!    tokens ([`Authenticator`], [`HttpAuthenticator`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)  ← navigation pipeline, login/logout, HTTP server
//!     ↕
//! Session Layer (this crate)  ← token + profile, expiry, consistency
//!     ↕
//! Protocol Layer (below)  ← Role, UserProfile, JsonCodec
//! ```

mod auth;
mod clock;
mod context;
mod error;
#[cfg(feature = "http")]
mod http_auth;
mod session;
mod storage;
mod store;
mod validator;

pub use auth::{Authenticator, LoginGrant};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::SessionContext;
pub use error::{FailureKind, SessionError};
#[cfg(feature = "http")]
pub use http_auth::HttpAuthenticator;
pub use session::{Session, StoreConfig};
pub use storage::{CookieJar, KeyValueStore, LocalStorage};
pub use store::SessionStore;
pub use validator::{TokenState, TokenValidator};
