//! Serializable ledger snapshot

use serde::{Deserialize, Serialize};

use super::{BudgetRecord, InflowRecord, OutflowRecord};

/// Complete copy of a ledger at one revision, including derived columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub revision: u64,
    /// Year prefix of the budget amount column (`2025_Budget_Amount`)
    pub budget_year: i32,
    pub inflow: Vec<InflowRecord>,
    pub outflow: Vec<OutflowRecord>,
    pub budget: Vec<BudgetRecord>,
}

impl LedgerSnapshot {
    pub fn empty() -> Self {
        Self {
            revision: 0,
            budget_year: crate::DEFAULT_BUDGET_YEAR,
            inflow: Vec::new(),
            outflow: Vec::new(),
            budget: Vec::new(),
        }
    }

    pub fn find_item(&self, item_id: &str) -> Option<&InflowRecord> {
        self.inflow.iter().find(|r| r.item_id == item_id)
    }
}
