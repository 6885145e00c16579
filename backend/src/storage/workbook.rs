//! `.xlsx` workbooks: calamine for reading, rust_xlsxwriter for writing

use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::str::FromStr;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::Timelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Sheet;

pub fn read_path(path: &Path) -> LedgerResult<Vec<Sheet>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    read_sheets(&mut workbook)
}

/// Read an uploaded workbook
pub fn read_bytes(bytes: &[u8]) -> LedgerResult<Vec<Sheet>> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| LedgerError::InvalidUpload(format!("not an .xlsx workbook: {}", e)))?;
    read_sheets(&mut workbook)
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Xlsx<RS>) -> LedgerResult<Vec<Sheet>> {
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        sheets.push(Sheet::from_rows(name, rows));
    }
    Ok(sheets)
}

/// Render a cell the way the ledger's text parsers expect it
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.num_seconds_from_midnight() == 0 => ts.format("%Y-%m-%d").to_string(),
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

/// Serialize sheets into `.xlsx` bytes; numeric columns are written as numbers
pub fn to_bytes(sheets: &[Sheet]) -> LedgerResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&sheet.name)?;

        for (c, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string(0, column(c)?, header)?;
        }
        for (r, row) in sheet.rows.iter().enumerate() {
            let r = u32::try_from(r + 1)
                .map_err(|_| LedgerError::Workbook("too many rows".to_string()))?;
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let col = column(c)?;
                match numeric_value(sheet, c, value) {
                    Some(number) => worksheet.write_number(r, col, number)?,
                    None => worksheet.write_string(r, col, value)?,
                };
            }
        }

        workbook.push_worksheet(worksheet);
    }

    Ok(workbook.save_to_buffer()?)
}

fn column(c: usize) -> LedgerResult<u16> {
    u16::try_from(c).map_err(|_| LedgerError::Workbook("too many columns".to_string()))
}

/// A numeric cell is written as a number only when the `f64` holds it exactly;
/// anything wider stays text so the decimal survives a round-trip.
fn numeric_value(sheet: &Sheet, column: usize, value: &str) -> Option<f64> {
    if !sheet.is_numeric(column) {
        return None;
    }
    let decimal = Decimal::from_str(value).ok()?;
    let number = decimal.to_f64()?;
    Decimal::from_str(&number.to_string())
        .ok()
        .filter(|back| *back == decimal)
        .map(|_| number)
}
