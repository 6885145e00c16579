//! Distribution (outflow) records

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DistributionInput;

/// One distribution of purchased items to an event or department.
///
/// Immutable once created. Item type, name and unit cost are copied from the
/// inflow record at distribution time so later price edits never change the
/// value of past distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutflowRecord {
    pub item_id: String,
    pub item_type: Option<String>,
    pub item_name: Option<String>,
    pub quantity: u32,
    /// Frozen unit cost snapshot
    pub cost_per_item: Option<Decimal>,
    pub event_type: String,
    pub event_name: Option<String>,
    pub department: Option<String>,
    pub distributed_on: Option<NaiveDate>,
    pub gift: Option<bool>,
    pub notes: Option<String>,
    /// Caller-supplied idempotency key
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl OutflowRecord {
    /// Frozen cost times quantity, if a cost snapshot exists
    pub fn total_cost(&self) -> Option<Decimal> {
        self.cost_per_item
            .and_then(|cost| cost.checked_mul(Decimal::from(self.quantity)))
    }

    /// Value used in aggregates; rows without a cost snapshot count as zero
    pub fn value(&self) -> Decimal {
        self.total_cost().unwrap_or(Decimal::ZERO)
    }

    /// True when `input` asks for exactly this distribution
    pub fn matches_request(&self, input: &DistributionInput) -> bool {
        self.item_id == input.item_id
            && i64::from(self.quantity) == input.quantity
            && self.event_type == input.event_type
            && self.event_name.as_deref().unwrap_or_default() == input.event_name
            && self.department.as_deref().unwrap_or_default() == input.department
    }
}
