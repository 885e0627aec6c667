//! `DashboardServer` builder and server loop.
//!
//! Serves the dashboard's HTTP boundary. Routes:
//!
//! | Method     | Path                  | Guarded | Handler                         |
//! |------------|-----------------------|---------|---------------------------------|
//! | GET        | `/login`              | no      | login page shell                |
//! | POST       | `/login`              | no      | credentials → session cookies   |
//! | GET, POST  | `/logout`             | no      | `303` to login, cookies removed |
//! | GET        | `/dashboard`          | yes     | guard redirects to landing      |
//! | GET        | `/dashboard/{*page}`  | yes     | mount check, then page shell    |
//!
//! `/login` and `/dashboard` are the defaults of `GuardConfig::login_path`
//! and `GuardConfig::protected_prefix`; the routes follow the configuration.

use std::sync::Arc;

use agrodash_access::NavigationTable;
use agrodash_guard::{GuardConfig, RouteGuard, layer};
use agrodash_protocol::JsonCodec;
use agrodash_session::{Authenticator, Clock, StoreConfig, SystemClock, TokenValidator};
use axum::{Router, routing::get};
use tokio::net::TcpListener;

use crate::handler::{ServerState, dashboard_page, login_page, login_submit, logout};
use crate::config::validate_guard;
use crate::{AgrodashError, DashboardConfig};

/// Builder for configuring and starting a dashboard server.
///
/// # Example
///
/// ```rust,no_run
/// use agrodash::prelude::*;
///
/// # async fn start() -> Result<(), AgrodashError> {
/// let auth = HttpAuthenticator::new("http://127.0.0.1:8000")?;
/// let server = DashboardServer::builder()
///     .bind("0.0.0.0:3000")
///     .build(auth)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DashboardServerBuilder {
    bind_addr: String,
    guard: GuardConfig,
    store: StoreConfig,
    navigation: NavigationTable,
    clock: Arc<dyn Clock>,
}

impl DashboardServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            guard: GuardConfig::default(),
            store: StoreConfig::default(),
            navigation: NavigationTable::dashboard(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Starts from loaded configuration.
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new()
            .bind(&config.bind.to_string())
            .guard_config(config.guard.clone())
            .store_config(config.store.clone())
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn guard_config(mut self, config: GuardConfig) -> Self {
        self.guard = config;
        self
    }

    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store = config;
        self
    }

    /// Replaces the default menu.
    pub fn navigation(mut self, table: NavigationTable) -> Self {
        self.navigation = table;
        self
    }

    /// Sets the clock token expiry is judged against.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Binds the listener and assembles the router around `auth`.
    ///
    /// # Errors
    ///
    /// Fails with [`AgrodashError::Config`] when the guard paths disagree
    /// (see [`DashboardConfig`]), and with [`AgrodashError::Io`] when the
    /// address can't be bound.
    pub async fn build<A: Authenticator>(self, auth: A) -> Result<DashboardServer, AgrodashError> {
        validate_guard(&self.guard)?;
        let listener = TcpListener::bind(&self.bind_addr).await?;

        // The guard reads the same cookie the store writes the token to.
        let guard = RouteGuard::new(GuardConfig {
            token_cookie: self.store.token_key.clone(),
            ..self.guard
        });

        let state = Arc::new(ServerState {
            guard: guard.clone(),
            store: self.store,
            navigation: self.navigation,
            validator: TokenValidator::new(self.clock),
            codec: JsonCodec,
            auth,
        });

        let router = layer::guarded(routes::<A>(guard.config()), guard).with_state(state);

        Ok(DashboardServer { listener, router })
    }
}

fn routes<A: Authenticator>(config: &GuardConfig) -> Router<Arc<ServerState<A>>> {
    let prefix = config.protected_prefix.trim_end_matches('/');
    Router::new()
        .route(&config.login_path, get(login_page::<A>).post(login_submit::<A>))
        .route("/logout", get(logout::<A>).post(logout::<A>))
        .route(prefix, get(dashboard_page::<A>))
        .route(&format!("{prefix}/{{*page}}"), get(dashboard_page::<A>))
}

impl Default for DashboardServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound dashboard server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct DashboardServer {
    listener: TcpListener,
    router: Router,
}

impl DashboardServer {
    /// Creates a new builder.
    pub fn builder() -> DashboardServerBuilder {
        DashboardServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), AgrodashError> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "Agrodash server running");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
