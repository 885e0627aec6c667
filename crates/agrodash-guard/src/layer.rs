//! Axum middleware applying a [`RouteGuard`] to every request.
//!
//! ```rust,no_run
//! use agrodash_guard::{RouteGuard, layer};
//! use axum::{Router, routing::get};
//!
//! let app: Router = layer::guarded(
//!     Router::new().route("/dashboard/{*page}", get(|| async { "page" })),
//!     RouteGuard::default(),
//! );
//! ```

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};

use crate::{GuardDecision, RouteGuard, cookie};

/// Runs the guard against the request path and token cookie.
///
/// Redirects are `307 Temporary Redirect` with a `Location` header.
pub async fn enforce(State(guard): State<RouteGuard>, request: Request, next: Next) -> Response {
    let token = cookie::parse_cookie(request.headers(), &guard.config().token_cookie);

    match guard.authorize(request.uri().path(), token.as_deref()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectTo(to) => {
            tracing::debug!(path = request.uri().path(), %to, "guard redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}

/// Wraps every route of `router` with [`enforce`].
pub fn guarded<S>(router: Router<S>, guard: RouteGuard) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(guard, enforce))
}
