//! Shared types for the inventory ledger
//!
//! Records, form inputs, validation and read-only reports used by the
//! backend service and by the WebAssembly client helpers.

pub mod models;
pub mod report;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
