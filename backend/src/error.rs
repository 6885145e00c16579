//! Error handling for the inventory ledger
//!
//! Every failed ledger operation leaves the ledger unchanged; only load
//! failures abort before a ledger exists at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{TableKind, UnknownTable, Violation};
use thiserror::Error;

/// Source data that cannot be turned into a consistent ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("missing table {0}")]
    MissingTable(TableKind),

    #[error("table {table} is missing required column {column}")]
    MissingColumn { table: TableKind, column: String },

    #[error("table {table}, row {row}, column {column}: {reason} ({value:?})")]
    InvalidCell {
        table: TableKind,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("table {table} has duplicate key {key}")]
    DuplicateKey { table: TableKind, key: String },

    #[error("outflow row {row} references unknown item {item_id}")]
    UnknownItem { row: usize, item_id: String },

    #[error("item {item_id}: {reason}")]
    QuantityOutOfBounds { item_id: String, reason: String },
}

/// Ledger error types
#[derive(Error, Debug)]
pub enum LedgerError {
    // Load errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    // Operation errors
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },

    #[error("Insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Concurrency conflict: {0}")]
    Concurrency(String),

    #[error(transparent)]
    UnknownTable(#[from] UnknownTable),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    // Persistence errors
    #[error("Ledger source is read-only: {0}")]
    ReadOnlySource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote sheet error: {0}")]
    RemoteSheet(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LedgerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Validation(vec![Violation::new(field, message)])
    }

    pub fn item_not_found(item_id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            resource: "Item",
            key: item_id.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Schema(_) => "SCHEMA_ERROR",
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            LedgerError::Concurrency(_) => "CONCURRENCY_CONFLICT",
            LedgerError::UnknownTable(_) => "UNKNOWN_TABLE",
            LedgerError::InvalidUpload(_) => "INVALID_UPLOAD",
            LedgerError::ReadOnlySource(_) => "READ_ONLY_SOURCE",
            LedgerError::Io(_) => "IO_ERROR",
            LedgerError::Csv(_) => "CSV_ERROR",
            LedgerError::Workbook(_) => "WORKBOOK_ERROR",
            LedgerError::Json(_) => "JSON_ERROR",
            LedgerError::RemoteSheet(_) => "REMOTE_SHEET_ERROR",
            LedgerError::Configuration(_) => "CONFIGURATION_ERROR",
            LedgerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            LedgerError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::Validation(_)
            | LedgerError::UnknownTable(_)
            | LedgerError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::InsufficientStock { .. } | LedgerError::Concurrency(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::ReadOnlySource(_) => StatusCode::METHOD_NOT_ALLOWED,
            LedgerError::RemoteSheet(_) => StatusCode::BAD_GATEWAY,
            LedgerError::Io(_)
            | LedgerError::Csv(_)
            | LedgerError::Workbook(_)
            | LedgerError::Json(_)
            | LedgerError::Configuration(_)
            | LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<calamine::XlsxError> for LedgerError {
    fn from(err: calamine::XlsxError) -> Self {
        LedgerError::Workbook(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for LedgerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        LedgerError::Workbook(err.to_string())
    }
}

impl From<tempfile::PersistError> for LedgerError {
    fn from(err: tempfile::PersistError) -> Self {
        LedgerError::Io(err.error)
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let violations = match &self {
            LedgerError::Validation(violations) => violations.clone(),
            _ => Vec::new(),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        let detail = ErrorDetail {
            code: self.code().to_string(),
            message: self.to_string(),
            violations,
        };

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for ledger operations and handlers
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_violation() {
        let err = LedgerError::Validation(vec![
            Violation::new("item_name", "This field is required"),
            Violation::new("quantity", "Quantity must be at least 1"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: item_name: This field is required; quantity: Quantity must be at least 1"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stock_and_concurrency_errors_are_conflicts() {
        let stock = LedgerError::InsufficientStock {
            item_id: "I1".to_string(),
            requested: 3,
            available: 2,
        };
        assert_eq!(stock.status(), StatusCode::CONFLICT);
        assert_eq!(stock.code(), "INSUFFICIENT_STOCK");
        assert_eq!(
            LedgerError::Concurrency("stale".into()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn schema_errors_name_the_missing_column() {
        let err = LedgerError::from(SchemaError::MissingColumn {
            table: TableKind::Inflow,
            column: "Item_ID".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Schema error: table Inflow is missing required column Item_ID"
        );
    }
}
