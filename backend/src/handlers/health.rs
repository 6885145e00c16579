//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ledger_revision: u64,
    pub source: String,
}

/// Health check endpoint handler
pub async fn health_status(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger_revision: state.ledger.revision().await,
        source: state.ledger.source().to_string(),
    })
}
