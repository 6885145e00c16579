//! Inventory ledger backend
//!
//! Purchases (Inflow), distributions (Outflow) and event budgets (Budget)
//! kept as three spreadsheet-shaped tables, served over a JSON API.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{LedgerError, LedgerResult, SchemaError};
pub use ledger::Ledger;
use services::{LedgerService, ReportingService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: LedgerService,
    pub reporting: ReportingService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(ledger: LedgerService, config: Config) -> Self {
        Self {
            reporting: ReportingService::new(ledger.clone(), &config.report),
            ledger,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Inventory Ledger API v1"
}

/// Liveness check
async fn health_check() -> &'static str {
    "OK"
}
