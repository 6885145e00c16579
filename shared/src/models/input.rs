//! Form inputs for ledger operations

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input for recording a purchase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseInput {
    /// Generated from the submission timestamp when absent
    pub item_id: Option<String>,
    pub item_type: String,
    pub item_name: String,
    pub cost_per_item: Decimal,
    /// Signed so that zero and negative values surface as violations
    pub quantity: i64,
    pub code: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub vendor_name: String,
    pub vendor_address: Option<String>,
    pub contact_name: Option<String>,
    pub vendor_email: Option<String>,
    pub vendor_phone: Option<String>,
    pub description: Option<String>,
}

/// Input for distributing items from an existing purchase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionInput {
    pub item_id: String,
    pub quantity: i64,
    pub event_type: String,
    pub event_name: String,
    pub department: String,
    pub distribution_date: Option<NaiveDate>,
    pub gift: Option<bool>,
    pub notes: Option<String>,
    /// Idempotency key; a replay with the same key never decrements twice
    pub request_id: Option<String>,
    /// Reject the request if the ledger moved past this revision
    pub expected_revision: Option<u64>,
}

/// Input for setting a budget line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInput {
    pub budget_amount: Decimal,
}
