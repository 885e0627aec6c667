//! Request handlers for the dashboard server.
//!
//! The guard middleware has already run by the time a page handler is
//! called, so a page request always carries a token cookie. The handler is
//! the mount-time check: it rebuilds the session from the cookies, runs the
//! token validator once, and either draws the page shell or clears the
//! cookies and sends the browser to login.
//!
//! `POST` to the login path exchanges JSON credentials with the
//! authentication service and sets the session cookies on success.

use std::sync::Arc;

use agrodash_access::{NavigationItem, NavigationTable};
use agrodash_guard::{RouteGuard, cookie};
use agrodash_protocol::{Codec, Credentials, JsonCodec, UserProfile};
use agrodash_session::{
    Authenticator, FailureKind, Session, SessionError, StoreConfig, TokenValidator,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::app::establish;

/// Shared state handed to every handler.
pub(crate) struct ServerState<A: Authenticator> {
    pub(crate) guard: RouteGuard,
    pub(crate) store: StoreConfig,
    pub(crate) navigation: NavigationTable,
    pub(crate) validator: TokenValidator,
    pub(crate) codec: JsonCodec,
    pub(crate) auth: A,
}

impl<A: Authenticator> ServerState<A> {
    /// Rebuilds the session a browser is presenting.
    fn session_from(&self, headers: &HeaderMap) -> Result<Session, SessionError> {
        let token = cookie::parse_cookie(headers, &self.store.token_key).filter(|t| !t.is_empty());
        let user = cookie::parse_cookie(headers, &self.store.user_key);

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => return Err(SessionError::Missing),
            (Some(_), None) => return Err(SessionError::Partial("token without profile")),
            (None, Some(_)) => return Err(SessionError::Partial("profile without token")),
        };

        let profile: UserProfile = self
            .codec
            .decode(&user)
            .map_err(SessionError::MalformedProfile)?;

        let session = Session { token, profile };
        self.validator.validate(&session)?;
        Ok(session)
    }

    /// `303` to login with both session cookies deleted.
    fn logout_response(&self) -> Response {
        let mut response = Redirect::to(&self.guard.config().login_path).into_response();
        let headers = response.headers_mut();
        headers.append(header::SET_COOKIE, cookie::removal(&self.store.token_key));
        headers.append(header::SET_COOKIE, cookie::removal(&self.store.user_key));
        response
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(crate) async fn login_page<A: Authenticator>(
    State(state): State<Arc<ServerState<A>>>,
) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<title>Agrodash · Sign in</title>\n<main id=\"login\" data-action=\"{}\"></main>\n",
        escape(&state.guard.config().login_path)
    ))
}

/// Exchanges credentials for a session and sets both cookies.
///
/// Success is a `303` to the default landing page. A rejected login is
/// `401`; an unreachable authentication service is `503`.
pub(crate) async fn login_submit<A: Authenticator>(
    State(state): State<Arc<ServerState<A>>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    let session = match establish(&state.auth, &credentials).await {
        Ok(session) => session,
        Err(err) => {
            tracing::info!(email = %credentials.email, reason = %err, "login failed");
            let status = match &err {
                SessionError::AuthUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::UNAUTHORIZED,
            };
            return (status, Json(json!({ "error": err.to_string() }))).into_response();
        }
    };

    let user = match state.codec.encode(&session.profile) {
        Ok(user) => user,
        Err(err) => {
            tracing::error!(error = %err, "could not encode profile");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(user_id = session.user_id(), role = %session.role(), "logged in");

    let max_age = state.store.cookie_max_age_secs;
    let mut response = Redirect::to(&state.guard.config().default_landing).into_response();
    let headers = response.headers_mut();
    headers.append(
        header::SET_COOKIE,
        cookie::setting(&state.store.token_key, &session.token, max_age),
    );
    headers.append(
        header::SET_COOKIE,
        cookie::setting(&state.store.user_key, &user, max_age),
    );
    response
}

pub(crate) async fn logout<A: Authenticator>(
    State(state): State<Arc<ServerState<A>>>,
) -> Response {
    tracing::info!("logout requested");
    state.logout_response()
}

pub(crate) async fn dashboard_page<A: Authenticator>(
    State(state): State<Arc<ServerState<A>>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri.path();

    match state.session_from(&headers) {
        Ok(session) => {
            let items = state.navigation.visible_for_role(session.role());
            Html(render_page(path, &session, &items)).into_response()
        }
        Err(err) => {
            match err.kind() {
                FailureKind::MissingSession => {
                    tracing::debug!(path, reason = %err, "no session at mount");
                }
                FailureKind::ExpiredSession => {
                    tracing::info!(path, reason = %err, "session expired at mount");
                }
                FailureKind::MalformedProfile | FailureKind::LoginFailed => {
                    tracing::warn!(path, reason = %err, "unusable session at mount");
                }
            }
            state.logout_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_page(path: &str, session: &Session, items: &[&NavigationItem]) -> String {
    let mut html = String::from("<!doctype html>\n<title>Agrodash</title>\n<nav>\n");
    for item in items {
        let current = if item.path() == path { " aria-current=\"page\"" } else { "" };
        html.push_str(&format!(
            "  <a href=\"{}\" data-icon=\"{}\"{current}>{}</a>\n",
            escape(item.path()),
            escape(item.icon()),
            escape(item.label()),
        ));
    }
    html.push_str(&format!(
        "</nav>\n<main data-path=\"{}\" data-role=\"{}\">{}</main>\n",
        escape(path),
        session.role(),
        escape(&session.profile.name),
    ));
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
