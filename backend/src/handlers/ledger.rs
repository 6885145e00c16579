//! Whole-ledger handlers: inspection, reload, save, import and export

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use shared::{LedgerSnapshot, TableKind};

use crate::error::{LedgerError, LedgerResult};
use crate::services::LedgerStatus;
use crate::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Full ledger snapshot
pub async fn get_ledger(State(state): State<AppState>) -> Json<LedgerSnapshot> {
    Json(state.ledger.snapshot().await)
}

pub async fn get_ledger_status(State(state): State<AppState>) -> Json<LedgerStatus> {
    Json(state.ledger.status().await)
}

/// Rows of one table
pub async fn get_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> LedgerResult<Json<serde_json::Value>> {
    let table: TableKind = table.parse()?;
    Ok(Json(state.ledger.table(table).await?))
}

pub async fn reload_ledger(State(state): State<AppState>) -> LedgerResult<Json<LedgerStatus>> {
    Ok(Json(state.ledger.reload().await?))
}

pub async fn save_ledger(State(state): State<AppState>) -> LedgerResult<Json<LedgerStatus>> {
    Ok(Json(state.ledger.save().await?))
}

/// Replace the ledger with an uploaded `.xlsx` workbook (first file field)
pub async fn import_workbook(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> LedgerResult<Json<LedgerStatus>> {
    let mut file_data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LedgerError::InvalidUpload(e.to_string()))?
    {
        if field.file_name().is_some() || field.name() == Some("workbook") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| LedgerError::InvalidUpload(e.to_string()))?;
            file_data = Some(bytes.to_vec());
            break;
        }
    }

    let bytes = file_data
        .filter(|b| !b.is_empty())
        .ok_or_else(|| LedgerError::InvalidUpload("no workbook file received".to_string()))?;
    Ok(Json(state.ledger.replace_from_workbook(bytes).await?))
}

/// Download the ledger as `.xlsx`
pub async fn export_workbook(State(state): State<AppState>) -> LedgerResult<impl IntoResponse> {
    let bytes = state.ledger.export_workbook().await?;
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory_ledger.xlsx\"",
            ),
        ],
        bytes,
    ))
}
