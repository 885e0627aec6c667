//! Token validation: is the stored session still usable right now?
//!
//! The validator is a two-state machine evaluated once per protected-page
//! mount:
//!
//! ```text
//!            load + decode + compare exp
//!   mount ───────────────────────────────→ VALID   (render the page)
//!                       │
//!                       └──────────────────→ INVALID (clear, go to login)
//! ```
//!
//! It does not poll. A token that expires while a page is open is noticed
//! on the next mount, not before.
//!
//! The token is decoded WITHOUT verifying its signature. The dashboard
//! holds no key; the service behind every data call verifies the signature.
//! This check only decides whether it is worth sending the token at all.

use std::sync::Arc;

use agrodash_protocol::Role;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use crate::{Clock, Session, SessionError, SessionStore};

/// Outcome of one validation pass.
#[derive(Debug)]
pub enum TokenState {
    /// Token present, unexpired, and consistent with the profile.
    Valid(Session),
    /// Anything else. The error says why.
    Invalid(SessionError),
}

impl TokenState {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Converts into a `Result`, for callers that want `?`.
    pub fn into_result(self) -> Result<Session, SessionError> {
        match self {
            Self::Valid(session) => Ok(session),
            Self::Invalid(err) => Err(err),
        }
    }
}

/// Checks stored sessions against their token's embedded claims.
#[derive(Clone)]
pub struct TokenValidator {
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Loads the session from `store` and validates it.
    ///
    /// This does not clear anything; [`SessionContext::check`](crate::SessionContext::check)
    /// owns that side effect.
    pub fn check(&self, store: &SessionStore) -> TokenState {
        match store.load().and_then(|session| {
            self.validate(&session)?;
            Ok(session)
        }) {
            Ok(session) => TokenState::Valid(session),
            Err(err) => TokenState::Invalid(err),
        }
    }

    /// Validates a session's token against the clock and its profile.
    ///
    /// # Errors
    /// - [`SessionError::MalformedToken`]: not a three-part JWT, payload
    ///   not base64url JSON, or no numeric `exp` claim
    /// - [`SessionError::Expired`]: `exp` is at or before now
    /// - [`SessionError::Inconsistent`]: `sub` or `role` claims contradict
    ///   the profile
    pub fn validate(&self, session: &Session) -> Result<(), SessionError> {
        let claims = decode_claims(&session.token)?;
        let expires_at = expiry(&claims)?;

        let now = self.clock.now_unix();
        if expires_at <= now {
            return Err(SessionError::Expired {
                expired_at: expires_at,
            });
        }

        if let Some(subject) = claims.get("sub").and_then(claim_text) {
            if subject != session.profile.id {
                return Err(SessionError::Inconsistent(format!(
                    "token subject {subject:?} is not profile user {:?}",
                    session.profile.id
                )));
            }
        }

        if let Some(raw_role) = claims.get("role").and_then(Value::as_str) {
            if Role::parse(raw_role) != Some(session.profile.role) {
                return Err(SessionError::Inconsistent(format!(
                    "token role {raw_role:?} is not profile role {}",
                    session.profile.role
                )));
            }
        }

        Ok(())
    }

    /// Returns the `exp` claim of `token` in Unix seconds.
    ///
    /// # Errors
    /// Returns [`SessionError::MalformedToken`] if the token doesn't decode
    /// or has no `exp`.
    pub fn expires_at(token: &str) -> Result<u64, SessionError> {
        expiry(&decode_claims(token)?)
    }
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("now", &self.clock.now_unix())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Claim decoding
// ---------------------------------------------------------------------------

fn decode_claims(token: &str) -> Result<Map<String, Value>, SessionError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(SessionError::MalformedToken(
            "expected three dot-separated segments".into(),
        ));
    };

    // Some issuers pad their segments; base64url-without-padding rejects
    // the `=`, so drop it first.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| SessionError::MalformedToken(format!("payload is not a JSON object: {e}")))
}

fn expiry(claims: &Map<String, Value>) -> Result<u64, SessionError> {
    let exp = claims
        .get("exp")
        .ok_or_else(|| SessionError::MalformedToken("missing exp claim".into()))?;

    if let Some(secs) = exp.as_u64() {
        return Ok(secs);
    }
    // Fractional or negative timestamps: floor, and treat anything before
    // the epoch as long expired.
    match exp.as_f64() {
        Some(secs) if secs.is_finite() => Ok(if secs <= 0.0 { 0 } else { secs.floor() as u64 }),
        _ => Err(SessionError::MalformedToken("exp claim is not a number".into())),
    }
}

/// `sub` is a string in every issuer we've seen, but numeric ids show up
/// too. Both compare as text.
fn claim_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
