//! The seam to the external authentication service.
//!
//! Agrodash doesn't issue tokens or store passwords. An authentication
//! service does, and the dashboard talks to it through the
//! [`Authenticator`] trait: one call to exchange credentials for a token,
//! one call to look up the user's role. [`HttpAuthenticator`](crate::HttpAuthenticator)
//! implements it over HTTP; tests implement it in memory.
//!
//! Failures are surfaced to the caller as-is. Nothing here retries.

use agrodash_protocol::{Credentials, LoginResponse, RoleLookupResponse};

use crate::SessionError;

/// What a successful login hands back, before the role is known.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// The bearer token.
    pub token: String,
    /// The user id the role lookup is keyed by.
    pub user_id: String,
    /// Display name, when the service includes one.
    pub name: Option<String>,
}

impl std::fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGrant")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .finish()
    }
}

impl TryFrom<LoginResponse> for LoginGrant {
    type Error = SessionError;

    /// A login body without `access_token` (or with an empty one) is a
    /// failed login even if the service answered 2xx.
    fn try_from(body: LoginResponse) -> Result<Self, Self::Error> {
        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SessionError::AuthFailed("response has no access_token".into()))?;
        let user_id = body
            .user_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SessionError::AuthFailed("response has no user id".into()))?;

        Ok(Self {
            token,
            user_id,
            name: body.name,
        })
    }
}

/// Exchanges credentials for a token and looks up roles.
///
/// # Trait bounds
///
/// - `Send + Sync` → one authenticator is shared by every request the
///   dashboard serves.
/// - `'static` → it lives as long as the application.
///
/// # Example
///
/// ```rust
/// use agrodash_protocol::{Credentials, RoleLookupResponse};
/// use agrodash_session::{Authenticator, LoginGrant, SessionError};
///
/// /// Lets exactly one demo user in. Development only.
/// struct DemoAuthenticator;
///
/// impl Authenticator for DemoAuthenticator {
///     async fn authenticate(
///         &self,
///         credentials: &Credentials,
///     ) -> Result<LoginGrant, SessionError> {
///         if credentials.email != "demo@example.com" {
///             return Err(SessionError::AuthFailed("unknown user".into()));
///         }
///         Ok(LoginGrant {
///             token: "demo.token.sig".into(),
///             user_id: "demo".into(),
///             name: Some("Demo".into()),
///         })
///     }
///
///     async fn lookup_role(
///         &self,
///         _user_id: &str,
///         _token: &str,
///     ) -> Result<RoleLookupResponse, SessionError> {
///         Ok(RoleLookupResponse { role: "manager".into(), centers: None })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Exchanges credentials for a token and user id.
    ///
    /// # Returns
    /// - `Ok(LoginGrant)`: the service issued a token
    /// - `Err(SessionError::AuthFailed)`: rejected, or no `access_token`
    /// - `Err(SessionError::AuthUnavailable)`: the service didn't answer
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<LoginGrant, SessionError>> + Send;

    /// Looks up the role (and center affiliations) for `user_id`.
    ///
    /// The role comes back as the service spells it; normalization happens
    /// in the caller.
    fn lookup_role(
        &self,
        user_id: &str,
        token: &str,
    ) -> impl std::future::Future<Output = Result<RoleLookupResponse, SessionError>> + Send;
}
