//! Runs the Agrodash gate in front of the dashboard.
//!
//! Configuration comes from `AGRODASH_*` environment variables (see
//! `DashboardConfig`); log verbosity from `RUST_LOG`.

use agrodash::prelude::*;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = start().await {
        tracing::error!("gate server stopped: {e}");
        std::process::exit(1);
    }
}

async fn start() -> Result<(), AgrodashError> {
    let config = DashboardConfig::from_env()?;
    let auth = HttpAuthenticator::new(&config.auth_url)?;

    let server = DashboardServerBuilder::from_config(&config)
        .build(auth)
        .await?;

    tracing::info!(
        addr = %server.local_addr()?,
        auth_url = %config.auth_url,
        login = %config.guard.login_path,
        "listening"
    );
    server.run().await
}
