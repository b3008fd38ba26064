//! Payroll ledger HTTP server.
//!
//! Usage: `payroll-ledger [CONFIG_PATH]`. The configuration defaults to
//! `./config/payroll.yaml`.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use payroll_ledger::api::{AppState, create_router};
use payroll_ledger::config::ConfigLoader;
use payroll_ledger::identity::InMemoryIdentityProvider;
use payroll_ledger::session::SessionRegistry;
use payroll_ledger::store::open_store;

const DEFAULT_CONFIG_PATH: &str = "./config/payroll.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ConfigLoader::load(&config_path)?.into_config();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))?;
    fmt().with_env_filter(filter).init();

    info!(config = %config_path, "Configuration loaded");

    let store = open_store(&config.store)?;
    let state = AppState::new(
        store,
        Arc::new(InMemoryIdentityProvider::new()),
        SessionRegistry::new(
            config.session.cookie_name.clone(),
            config.session.max_age(),
        ),
    );

    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Payroll ledger listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
