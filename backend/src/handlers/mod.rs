//! HTTP handlers

pub mod budget;
pub mod distributions;
pub mod health;
pub mod ledger;
pub mod purchases;
pub mod reporting;

pub use budget::*;
pub use distributions::*;
pub use health::*;
pub use ledger::*;
pub use purchases::*;
pub use reporting::*;
