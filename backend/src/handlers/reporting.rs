//! Reporting handlers for dashboard figures and CSV export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::report::{LedgerOverview, TopRankings};

use crate::error::LedgerResult;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub n: Option<usize>,
}

fn respond<T: Serialize>(data: Vec<T>, query: &ReportQuery, filename: &str) -> LedgerResult<Response> {
    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        let disposition = format!("attachment; filename=\"{}.csv\"", filename);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Headline totals and threshold warnings
pub async fn get_overview(State(state): State<AppState>) -> Json<LedgerOverview> {
    Json(state.reporting.overview().await)
}

/// Purchases and distributions per item type
pub async fn get_item_type_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> LedgerResult<Response> {
    let data = state.reporting.item_types().await;
    respond(data, &query, "item_types")
}

/// Budget against spend per event type
pub async fn get_event_type_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> LedgerResult<Response> {
    let data = state.reporting.event_types().await;
    respond(data, &query, "event_types")
}

pub async fn get_department_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> LedgerResult<Response> {
    let data = state.reporting.departments().await;
    respond(data, &query, "departments")
}

pub async fn get_monthly_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> LedgerResult<Response> {
    let data = state.reporting.monthly_purchases().await;
    respond(data, &query, "monthly_purchases")
}

pub async fn get_top_rankings(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> Json<TopRankings> {
    Json(state.reporting.top(query.n).await)
}
