//! WebAssembly module for the Inventory Ledger dashboard
//!
//! Provides client-side computation for:
//! - Purchase and distribution form pre-validation
//! - Total cost and budget utilization
//! - Overview figures from a downloaded ledger snapshot

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn purchase_violations(form_json: &str) -> Result<String, String> {
    let input: PurchaseInput =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid purchase JSON: {}", e))?;
    serde_json::to_string(&validate_purchase(&input)).map_err(|e| e.to_string())
}

fn distribution_violations(form_json: &str, quantity_left: Option<u32>) -> Result<String, String> {
    let input: DistributionInput = serde_json::from_str(form_json)
        .map_err(|e| format!("Invalid distribution JSON: {}", e))?;

    let mut violations = validate_distribution(&input);
    if let Some(left) = quantity_left {
        if input.quantity > 0 && !can_distribute(input.quantity, left) {
            violations.push(Violation::new(
                "quantity",
                format!("Only {} left in stock", left),
            ));
        }
    }
    serde_json::to_string(&violations).map_err(|e| e.to_string())
}

fn overview_json(
    snapshot_json: &str,
    utilization_warning_percent: f64,
    low_stock_threshold: u32,
) -> Result<String, String> {
    let snapshot: LedgerSnapshot =
        serde_json::from_str(snapshot_json).map_err(|e| format!("Invalid ledger JSON: {}", e))?;
    let thresholds = ReportThresholds {
        utilization_warning_percent: to_decimal(utilization_warning_percent),
        low_stock_threshold: u64::from(low_stock_threshold),
    };
    let overview = shared::report::build_overview(&snapshot, &thresholds);
    serde_json::to_string(&overview).map_err(|e| e.to_string())
}

/// Validate a purchase form; returns a JSON array of violations (empty when valid)
#[wasm_bindgen]
pub fn validate_purchase_form(form_json: &str) -> Result<String, JsValue> {
    purchase_violations(form_json).map_err(|e| JsValue::from_str(&e))
}

/// Validate a distribution form, optionally against the item's remaining stock
#[wasm_bindgen]
pub fn validate_distribution_form(
    form_json: &str,
    quantity_left: Option<u32>,
) -> Result<String, JsValue> {
    distribution_violations(form_json, quantity_left).map_err(|e| JsValue::from_str(&e))
}

/// Total cost of a purchase line; falls back to float math past the decimal range
#[wasm_bindgen]
pub fn calculate_total_cost(cost_per_item: f64, quantity: u32) -> f64 {
    to_decimal(cost_per_item)
        .checked_mul(Decimal::from(quantity))
        .map(to_f64)
        .unwrap_or(cost_per_item * f64::from(quantity))
}

/// Spent as a percentage of budget; undefined when there is no budget
#[wasm_bindgen]
pub fn calculate_budget_utilization(spent: f64, budget: f64) -> Option<f64> {
    utilization_percent(to_decimal(spent), to_decimal(budget)).map(to_f64)
}

/// Whether `requested` items can be taken from a line with `quantity_left`
#[wasm_bindgen]
pub fn can_distribute(requested: i64, quantity_left: u32) -> bool {
    requested >= 1 && requested <= i64::from(quantity_left)
}

/// Overview figures for a ledger snapshot, as JSON
#[wasm_bindgen]
pub fn summarize_ledger_overview(
    snapshot_json: &str,
    utilization_warning_percent: f64,
    low_stock_threshold: u32,
) -> Result<String, JsValue> {
    overview_json(snapshot_json, utilization_warning_percent, low_stock_threshold)
        .map_err(|e| JsValue::from_str(&e))
}
