//! Error types for the session layer.

use agrodash_protocol::ProtocolError;

/// Errors that can occur while storing, reading, validating, or
/// establishing a session.
///
/// None of these are fatal to the application. Every variant in the
/// "no usable session" family resolves the same way, by clearing the store
/// and sending the user to the login page; the variants exist so logs can
/// say WHY.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Nothing is stored. The normal state for a logged-out user.
    #[error("no session stored")]
    Missing,

    /// Some of the session is stored but not all of it: a token without a
    /// profile, a profile without a token, or cookie and local copies that
    /// disagree.
    #[error("partial session: {0}")]
    Partial(&'static str),

    /// The `user` blob is present but does not decode as a profile.
    #[error("malformed profile: {0}")]
    MalformedProfile(#[source] ProtocolError),

    /// The token is not a decodable JWT or carries no `exp` claim.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The token's `exp` claim is at or before the current time.
    #[error("session expired at {expired_at}")]
    Expired {
        /// Unix seconds from the token's `exp` claim.
        expired_at: u64,
    },

    /// The token's claims contradict the stored profile (different user
    /// id or role).
    #[error("token and profile disagree: {0}")]
    Inconsistent(String),

    /// The authentication service rejected the login or returned a body
    /// without the fields a session needs.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The authentication service could not be reached.
    #[error("authentication service unavailable: {0}")]
    AuthUnavailable(String),

    /// The profile could not be encoded for storage.
    #[error("could not encode profile: {0}")]
    Encode(#[source] ProtocolError),
}

/// Coarse classification of a [`SessionError`], used for telemetry.
///
/// Behaviour never branches on this: every session-side kind ends in a
/// redirect to login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No token, or an incomplete session.
    MissingSession,
    /// Token present but stale.
    ExpiredSession,
    /// Profile blob or token claims unreadable or contradictory.
    MalformedProfile,
    /// A login attempt did not produce a session.
    LoginFailed,
}

impl SessionError {
    /// Returns the telemetry bucket this error falls into.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Missing | Self::Partial(_) => FailureKind::MissingSession,
            Self::Expired { .. } => FailureKind::ExpiredSession,
            Self::MalformedProfile(_) | Self::MalformedToken(_) | Self::Inconsistent(_) => {
                FailureKind::MalformedProfile
            }
            Self::AuthFailed(_) | Self::AuthUnavailable(_) | Self::Encode(_) => {
                FailureKind::LoginFailed
            }
        }
    }
}
