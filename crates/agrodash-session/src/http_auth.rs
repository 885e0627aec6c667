//! [`Authenticator`] over HTTP, using `reqwest`.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Call          | Request                               | Success body           |
//! |---------------|---------------------------------------|------------------------|
//! | authenticate  | `POST /auth/login` JSON `Credentials` | `LoginResponse`        |
//! | lookup_role   | `GET /users/{id}/role`, bearer token  | `RoleLookupResponse`   |
//!
//! Any non-2xx status is a failed login. Connection errors are reported
//! separately as [`SessionError::AuthUnavailable`] so the login page can
//! say "try again later" instead of "wrong password".

use agrodash_protocol::{Credentials, LoginResponse, RoleLookupResponse};
use reqwest::{Client, Url};

use crate::{Authenticator, LoginGrant, SessionError};

/// Talks to the authentication service at a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: Client,
    base: Url,
}

impl HttpAuthenticator {
    /// Creates an authenticator for the service at `base_url`.
    ///
    /// A path on the base URL is kept (`https://host/api` → requests go to
    /// `https://host/api/auth/login`).
    ///
    /// # Errors
    /// Returns [`SessionError::AuthUnavailable`] if `base_url` doesn't
    /// parse or can't carry a path.
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Like [`new`](Self::new) with a caller-configured client (timeouts,
    /// proxies, TLS roots).
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, SessionError> {
        let base = Url::parse(base_url)
            .map_err(|e| SessionError::AuthUnavailable(format!("bad base url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(SessionError::AuthUnavailable(format!(
                "base url {base_url:?} cannot carry a path"
            )));
        }
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SessionError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SessionError::AuthUnavailable("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant, SessionError> {
        let url = self.endpoint(&["auth", "login"])?;
        tracing::debug!(%url, email = %credentials.email, "requesting login");

        let response = self
            .client
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| SessionError::AuthUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(%status, email = %credentials.email, "login rejected");
            return Err(SessionError::AuthFailed(format!(
                "login rejected with status {status}"
            )));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| SessionError::AuthFailed(format!("unreadable login response: {e}")))?;

        LoginGrant::try_from(body)
    }

    async fn lookup_role(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<RoleLookupResponse, SessionError> {
        let url = self.endpoint(&["users", user_id, "role"])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SessionError::AuthUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::AuthFailed(format!(
                "role lookup for user {user_id} failed with status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SessionError::AuthFailed(format!("unreadable role response: {e}")))
    }
}
