//! Inventory Ledger - Backend Server
//!
//! Loads the ledger from the configured workbook, CSV directory, snapshot or
//! public sheet and serves it over HTTP.

use std::net::SocketAddr;

use inventory_ledger_backend::{
    create_app, services::LedgerService, storage::LedgerSource, AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "ledger_server=debug,inventory_ledger_backend=debug,tower_http=debug".into()
    });
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Inventory Ledger Server");
    tracing::info!("Environment: {}", config.environment);

    let source = LedgerSource::from_config(&config.ledger)?;
    tracing::info!("Loading ledger from {}", source);
    let ledger = LedgerService::load(source, config.ledger.auto_save).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(ledger, config);
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
