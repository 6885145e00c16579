//! Business logic services for the inventory ledger

pub mod ledger;
pub mod reporting;

pub use ledger::{LedgerService, LedgerStatus};
pub use reporting::ReportingService;
