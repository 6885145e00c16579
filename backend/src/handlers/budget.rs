//! Budget line handlers

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{BudgetInput, BudgetRecord};

use crate::error::LedgerResult;
use crate::AppState;

/// Create or update the budget for an event type
pub async fn set_budget(
    State(state): State<AppState>,
    Path(event_type): Path<String>,
    Json(input): Json<BudgetInput>,
) -> LedgerResult<Json<BudgetRecord>> {
    let record = state
        .ledger
        .set_budget(&event_type, input.budget_amount)
        .await?;
    Ok(Json(record))
}

pub async fn remove_budget(
    State(state): State<AppState>,
    Path(event_type): Path<String>,
) -> LedgerResult<Json<BudgetRecord>> {
    Ok(Json(state.ledger.remove_budget(&event_type).await?))
}
