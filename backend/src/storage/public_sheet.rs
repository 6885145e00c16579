//! Read-only ledger published as a public spreadsheet
//!
//! Each table is fetched as CSV from `<base_url><TableName>`, e.g. a Google
//! Sheets `.../gviz/tq?tqx=out:csv&sheet=` export URL.

use reqwest::Client;
use shared::TableKind;

use super::csv_dir::read_csv;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Sheet;

pub fn table_url(base_url: &str, table: TableKind) -> String {
    format!("{}{}", base_url, table.sheet_name())
}

pub async fn fetch_sheets(base_url: &str) -> LedgerResult<Vec<Sheet>> {
    let client = Client::new();
    let mut sheets = Vec::with_capacity(TableKind::ALL.len());

    for table in TableKind::ALL {
        let url = table_url(base_url, table);
        tracing::debug!("Fetching {} table from {}", table, url);

        let response = client.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(LedgerError::Schema(crate::error::SchemaError::MissingTable(table)));
        }
        sheets.push(read_csv(table.sheet_name(), body.as_ref())?);
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_appends_sheet_name() {
        assert_eq!(
            table_url("https://docs.example.com/export?sheet=", TableKind::Budget),
            "https://docs.example.com/export?sheet=Budget"
        );
    }
}
