//! Reporting service for dashboard figures and CSV export
//!
//! Reports are computed from a snapshot taken under the ledger lock; the
//! aggregation itself runs without holding it.

use serde::Serialize;
use shared::report::{
    self, DepartmentSummary, EventTypeSummary, ItemTypeSummary, LedgerOverview,
    MonthlyPurchaseSummary, TopRankings,
};
use shared::ReportThresholds;

use super::LedgerService;
use crate::config::ReportConfig;
use crate::error::{LedgerError, LedgerResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    ledger: LedgerService,
    thresholds: ReportThresholds,
    top_n: usize,
}

impl ReportingService {
    pub fn new(ledger: LedgerService, config: &ReportConfig) -> Self {
        Self {
            ledger,
            thresholds: config.thresholds(),
            top_n: config.top_n,
        }
    }

    pub async fn overview(&self) -> LedgerOverview {
        let snapshot = self.ledger.snapshot().await;
        report::build_overview(&snapshot, &self.thresholds)
    }

    pub async fn item_types(&self) -> Vec<ItemTypeSummary> {
        report::summarize_item_types(&self.ledger.snapshot().await)
    }

    pub async fn event_types(&self) -> Vec<EventTypeSummary> {
        report::summarize_event_types(&self.ledger.snapshot().await)
    }

    pub async fn departments(&self) -> Vec<DepartmentSummary> {
        report::summarize_departments(&self.ledger.snapshot().await)
    }

    pub async fn monthly_purchases(&self) -> Vec<MonthlyPurchaseSummary> {
        report::summarize_monthly_purchases(&self.ledger.snapshot().await)
    }

    /// Top-N rankings; `n` falls back to the configured default
    pub async fn top(&self, n: Option<usize>) -> TopRankings {
        let n = n.unwrap_or(self.top_n);
        report::top_rankings(&self.ledger.snapshot().await, n)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> LedgerResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| LedgerError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| LedgerError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
