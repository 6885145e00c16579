//! A directory of `Inflow.csv`, `Outflow.csv` and `Budget.csv`

use std::io::Read;
use std::path::{Path, PathBuf};

use shared::TableKind;

use super::{commit_staged, stage};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Sheet;

pub fn file_path(dir: &Path, table: TableKind) -> PathBuf {
    dir.join(format!("{}.csv", table.sheet_name()))
}

/// Read whichever table files exist; a missing one surfaces later as a missing table
pub fn read_dir(dir: &Path) -> LedgerResult<Vec<Sheet>> {
    if !dir.is_dir() {
        return Err(LedgerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("ledger directory {} does not exist", dir.display()),
        )));
    }

    TableKind::ALL
        .iter()
        .map(|table| (table, file_path(dir, *table)))
        .filter(|(_, path)| path.is_file())
        .map(|(table, path)| read_csv(table.sheet_name(), std::fs::File::open(path)?))
        .collect()
}

/// Parse one CSV table; rows may be ragged
pub fn read_csv<R: Read>(name: &str, reader: R) -> LedgerResult<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(Sheet::from_rows(name, rows))
}

pub fn to_csv_bytes(sheet: &Sheet) -> LedgerResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        wtr.write_record(row)?;
    }
    wtr.into_inner().map_err(|e| LedgerError::Io(e.into_error()))
}

/// Write every table file. All three are staged and synced before the first
/// rename, so a failure while writing leaves the old files untouched.
pub fn write_dir(dir: &Path, sheets: &[Sheet]) -> LedgerResult<()> {
    std::fs::create_dir_all(dir)?;

    let mut staged = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let path = dir.join(format!("{}.csv", sheet.name));
        staged.push((stage(&path, &to_csv_bytes(sheet)?)?, path));
    }
    for (file, path) in staged {
        commit_staged(file, &path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_rows_are_accepted() {
        let data = "Item_ID,Quantity,Notes\nI1,3\nI2,4,late\n";
        let sheet = read_csv("Outflow", data.as_bytes()).unwrap();
        assert_eq!(sheet.headers, ["Item_ID", "Quantity", "Notes"]);
        assert_eq!(sheet.rows[0], ["I1", "3"]);
        assert_eq!(sheet.rows[1], ["I2", "4", "late"]);
    }

    #[test]
    fn test_quoted_cells_round_trip() {
        let sheet = Sheet::from_rows(
            "Inflow",
            vec![
                vec!["Item_Name".to_string(), "Description".to_string()],
                vec!["Mug, large".to_string(), "says \"hi\"".to_string()],
            ],
        );
        let bytes = to_csv_bytes(&sheet).unwrap();
        let read = read_csv("Inflow", bytes.as_slice()).unwrap();
        assert_eq!(read.rows, sheet.rows);
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_dir(&dir.path().join("absent")),
            Err(LedgerError::Io(_))
        ));
    }
}
