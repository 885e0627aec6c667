//! # Agrodash
//!
//! Session and authorization gate for the Agrodash agribusiness dashboard.
//!
//! Agrodash decides, for every navigation, whether the user is logged in,
//! whether their token is still good, and which dashboard sections their
//! role may see. The pieces live in layered crates; this crate ties them
//! together:
//!
//! ```text
//! agrodash (facade)  ← Dashboard, DashboardServer, config
//!   ├── agrodash-guard     ← token-presence check at the boundary
//!   ├── agrodash-access    ← role → visible menu items
//!   ├── agrodash-session   ← token + profile storage, expiry, login seam
//!   └── agrodash-protocol  ← Role, UserProfile, JSON codec
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agrodash::prelude::*;
//!
//! # async fn start() -> Result<(), AgrodashError> {
//! let config = DashboardConfig::from_env()?;
//! let auth = HttpAuthenticator::new(&config.auth_url)?;
//! let server = DashboardServerBuilder::from_config(&config).build(auth).await?;
//! server.run().await
//! # }
//! ```

mod app;
mod config;
mod error;
mod handler;
mod server;

pub use app::{Dashboard, NavigationOutcome, Page, Redirect};
pub use config::{ConfigError, DashboardConfig};
pub use error::AgrodashError;
pub use server::{DashboardServer, DashboardServerBuilder};

/// Re-exports everything a dashboard application needs.
pub mod prelude {
    pub use crate::{
        AgrodashError, ConfigError, Dashboard, DashboardConfig, DashboardServer,
        DashboardServerBuilder, NavigationOutcome, Page, Redirect,
    };

    pub use agrodash_access::{NavigationItem, NavigationTable, visible_items};
    pub use agrodash_guard::{GuardConfig, GuardDecision, RouteGuard};
    pub use agrodash_protocol::{Center, Credentials, Role, UserProfile};
    pub use agrodash_session::{
        Authenticator, Clock, HttpAuthenticator, LoginGrant, ManualClock, Session,
        SessionContext, SessionError, StoreConfig, SystemClock, TokenState,
    };
}
