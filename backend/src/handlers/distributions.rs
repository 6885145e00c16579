//! Distribution (outflow) handlers

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use shared::DistributionInput;

use crate::error::{LedgerError, LedgerResult};
use crate::AppState;

pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// Distribute items. An `Idempotency-Key` header stands in for `request_id`;
/// a replayed request answers 200 with the original row instead of 201.
pub async fn create_distribution(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut input): Json<DistributionInput>,
) -> LedgerResult<impl IntoResponse> {
    if let Some(key) = headers.get(IDEMPOTENCY_KEY) {
        let key = key
            .to_str()
            .map_err(|_| LedgerError::validation("request_id", "Idempotency-Key must be text"))?
            .trim()
            .to_string();
        match input.request_id.as_deref().map(str::trim) {
            Some(body_id) if body_id != key => {
                return Err(LedgerError::validation(
                    "request_id",
                    "request_id and Idempotency-Key header disagree",
                ));
            }
            _ => input.request_id = Some(key),
        }
    }

    let outcome = state.ledger.distribute(input).await?;
    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}
