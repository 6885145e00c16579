//! Common types used across the ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Budget year assumed when a workbook does not name one
pub const DEFAULT_BUDGET_YEAR: i32 = 2025;

/// Spent as a percentage of budget, rounded to two places.
/// Returns `None` for a zero or negative budget, or when the ratio is out of range.
pub fn utilization_percent(spent: Decimal, budget: Decimal) -> Option<Decimal> {
    if budget <= Decimal::ZERO {
        return None;
    }
    spent
        .checked_div(budget)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(2))
}

/// Thresholds that turn report figures into warnings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportThresholds {
    /// Warn when overall budget utilization exceeds this percentage
    pub utilization_warning_percent: Decimal,
    /// Warn when total items in stock fall below this count
    pub low_stock_threshold: u64,
}

impl Default for ReportThresholds {
    fn default() -> Self {
        Self {
            utilization_warning_percent: Decimal::from(80),
            low_stock_threshold: 100,
        }
    }
}

/// A single failed business rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
