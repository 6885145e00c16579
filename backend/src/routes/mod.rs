//! Route definitions for the inventory ledger API

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Largest accepted workbook upload
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_status))
        .nest("/ledger", ledger_routes())
        .route("/purchases", post(handlers::create_purchase))
        .route("/purchases/:item_id", delete(handlers::delete_purchase))
        .route("/items/available", get(handlers::list_available_items))
        .route("/distributions", post(handlers::create_distribution))
        .route(
            "/budget/:event_type",
            put(handlers::set_budget).delete(handlers::remove_budget),
        )
        .nest("/reports", report_routes())
}

/// Whole-ledger routes
fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_ledger))
        .route("/status", get(handlers::get_ledger_status))
        .route("/tables/:table", get(handlers::get_table))
        .route("/reload", post(handlers::reload_ledger))
        .route("/save", post(handlers::save_ledger))
        .route(
            "/import",
            post(handlers::import_workbook).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/export", get(handlers::export_workbook))
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(handlers::get_overview))
        .route("/item-types", get(handlers::get_item_type_report))
        .route("/event-types", get(handlers::get_event_type_report))
        .route("/departments", get(handlers::get_department_report))
        .route("/monthly", get(handlers::get_monthly_report))
        .route("/top", get(handlers::get_top_rankings))
}
