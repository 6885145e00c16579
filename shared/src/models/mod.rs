//! Domain models for the inventory ledger

mod budget;
mod inflow;
mod input;
mod outflow;
mod snapshot;
mod table;

pub use budget::*;
pub use inflow::*;
pub use input::*;
pub use outflow::*;
pub use snapshot::*;
pub use table::*;
