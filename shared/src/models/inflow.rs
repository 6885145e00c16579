//! Purchase (inflow) records

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One purchased lot of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflowRecord {
    /// Unique key referenced by distributions
    pub item_id: String,
    /// Size class or category (the dashboard offers S, M, L)
    pub item_type: String,
    pub item_name: String,
    pub cost_per_item: Decimal,
    /// Quantity as purchased
    pub quantity: u32,
    /// Remaining undistributed quantity, never above `quantity`
    pub quantity_left: u32,
    /// Always `cost_per_item * quantity`
    pub total_cost: Decimal,
    pub code: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub vendor_name: Option<String>,
    pub vendor_address: Option<String>,
    pub contact_name: Option<String>,
    pub vendor_email: Option<String>,
    pub vendor_phone: Option<String>,
    pub description: Option<String>,
    pub submitted_at: Option<NaiveDateTime>,
    /// Columns the ledger does not interpret, kept for round-trips
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl InflowRecord {
    /// Total cost derived from unit cost and purchased quantity, `None` on overflow
    pub fn computed_total(&self) -> Option<Decimal> {
        self.cost_per_item.checked_mul(Decimal::from(self.quantity))
    }

    pub fn distributed_quantity(&self) -> u32 {
        self.quantity.saturating_sub(self.quantity_left)
    }

    pub fn is_available(&self) -> bool {
        self.quantity_left > 0
    }
}
