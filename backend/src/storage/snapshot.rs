//! JSON ledger snapshots

use std::path::Path;

use shared::LedgerSnapshot;

use super::write_atomic;
use crate::error::LedgerResult;

pub fn read(path: &Path) -> LedgerResult<LedgerSnapshot> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

pub fn write(path: &Path, snapshot: &LedgerSnapshot) -> LedgerResult<()> {
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    write_atomic(path, &bytes)
}
