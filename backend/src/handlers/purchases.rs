//! Purchase (inflow) handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::PurchaseInput;

use crate::error::LedgerResult;
use crate::AppState;

/// Record a purchase
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(input): Json<PurchaseInput>,
) -> LedgerResult<impl IntoResponse> {
    let record = state.ledger.purchase(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete a purchase nothing has been distributed from
pub async fn delete_purchase(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> LedgerResult<impl IntoResponse> {
    let record = state.ledger.delete_purchase(&item_id).await?;
    Ok(Json(record))
}

/// Items with stock left, for the distribution form
pub async fn list_available_items(State(state): State<AppState>) -> impl IntoResponse {
    let items = state.ledger.available_items().await;
    Json(serde_json::json!({ "items": items }))
}
