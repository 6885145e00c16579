//! Table identifiers

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three tables that make up a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Inflow,
    Outflow,
    Budget,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Inflow, TableKind::Outflow, TableKind::Budget];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Inflow => "inflow",
            TableKind::Outflow => "outflow",
            TableKind::Budget => "budget",
        }
    }

    /// Sheet (or CSV file stem) name used in persisted workbooks
    pub fn sheet_name(&self) -> &'static str {
        match self {
            TableKind::Inflow => "Inflow",
            TableKind::Outflow => "Outflow",
            TableKind::Budget => "Budget",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sheet_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown table: {0}")]
pub struct UnknownTable(pub String);

impl FromStr for TableKind {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTable(s.to_string()))
    }
}
