//! Budget line items

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Budget for one event type.
///
/// `actual_amount_spent` is derived from the outflow table and recomputed by
/// the ledger; it is never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub event_type: String,
    pub budget_amount: Decimal,
    pub actual_amount_spent: Decimal,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl BudgetRecord {
    pub fn new(event_type: impl Into<String>, budget_amount: Decimal) -> Self {
        Self {
            event_type: event_type.into(),
            budget_amount,
            actual_amount_spent: Decimal::ZERO,
            extra: BTreeMap::new(),
        }
    }

    pub fn remaining(&self) -> Decimal {
        self.budget_amount - self.actual_amount_spent
    }

    /// Spent as a percentage of budget, rounded to two places
    pub fn utilization_percent(&self) -> Option<Decimal> {
        crate::utilization_percent(self.actual_amount_spent, self.budget_amount)
    }
}
