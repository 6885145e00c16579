//! Column layout of the three ledger tables and the mapping between raw
//! sheets (rows of text cells) and typed records.
//!
//! Header matching ignores case and treats spaces as underscores, so
//! `Item_name`, `Item_Name` and `Item Name` resolve to the same column.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{BudgetRecord, InflowRecord, LedgerSnapshot, OutflowRecord, TableKind};

use crate::error::SchemaError;

/// A table as it appears in a workbook, CSV file or export URL
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Column indexes holding numbers
    pub numeric_columns: BTreeSet<usize>,
}

impl Sheet {
    /// Build a sheet from raw rows, the first being the header row.
    /// Cells are trimmed and fully blank rows dropped.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let mut rows = rows.into_iter().map(|row| {
            row.into_iter()
                .map(|cell| cell.trim().to_string())
                .collect::<Vec<_>>()
        });
        let headers = rows.next().unwrap_or_default();
        Self {
            name: name.into(),
            headers,
            rows: rows
                .filter(|row| row.iter().any(|cell| !cell.is_empty()))
                .collect(),
            numeric_columns: BTreeSet::new(),
        }
    }

    pub fn is_numeric(&self, column: usize) -> bool {
        self.numeric_columns.contains(&column)
    }
}

// ============================================================================
// Column definitions
// ============================================================================

struct Column {
    header: &'static str,
    aliases: &'static [&'static str],
    required: bool,
    numeric: bool,
}

const fn col(header: &'static str) -> Column {
    Column {
        header,
        aliases: &[],
        required: false,
        numeric: false,
    }
}

const fn required(header: &'static str) -> Column {
    Column {
        required: true,
        ..col(header)
    }
}

const fn numeric(column: Column) -> Column {
    Column {
        numeric: true,
        ..column
    }
}

const fn aliased(column: Column, aliases: &'static [&'static str]) -> Column {
    Column { aliases, ..column }
}

const ITEM_ID: &str = "Item_ID";
const ITEM_TYPE: &str = "Item_Type";
const ITEM_NAME: &str = "Item_Name";
const COST_PER_ITEM: &str = "Cost_per_Item";
const QUANTITY: &str = "Quantity";
const QUANTITY_LEFT: &str = "Quantity_Left";
const TOTAL_COST: &str = "Total_Cost";
const CODE: &str = "Code";
const PURCHASE_DATE: &str = "Purchase_Date";
const VENDOR_NAME: &str = "Vendor_Name";
const VENDOR_ADDRESS: &str = "Vendor_Address";
const CONTACT_NAME: &str = "Contact_Name_(Vendor)";
const VENDOR_EMAIL: &str = "Vendor_Email";
const VENDOR_PHONE: &str = "Vendor_Phone";
const DESCRIPTION: &str = "Description";
const SUBMITTED_AT: &str = "Submission_Timestamp";
const EVENT_TYPE: &str = "Event_Type";
const EVENT_NAME: &str = "Event_Name";
const DEPARTMENT: &str = "Department";
const DISTRIBUTED_ON: &str = "Date_of_Distribution";
const GIFT: &str = "Gift";
const REQUEST_ID: &str = "Request_ID";
const ACTUAL_SPENT: &str = "Actual_Amount_Spent";
const BUDGET_AMOUNT_SUFFIX: &str = "_budget_amount";

const INFLOW_COLUMNS: &[Column] = &[
    required(ITEM_ID),
    required(ITEM_TYPE),
    required(ITEM_NAME),
    numeric(required(COST_PER_ITEM)),
    numeric(required(QUANTITY)),
    numeric(col(QUANTITY_LEFT)),
    numeric(col(TOTAL_COST)),
    col(CODE),
    col(PURCHASE_DATE),
    col(VENDOR_NAME),
    col(VENDOR_ADDRESS),
    aliased(col(CONTACT_NAME), &["Contact_Name", "Vendor_Contact"]),
    col(VENDOR_EMAIL),
    col(VENDOR_PHONE),
    col(DESCRIPTION),
    col(SUBMITTED_AT),
];

const OUTFLOW_COLUMNS: &[Column] = &[
    required(ITEM_ID),
    col(ITEM_TYPE),
    col(ITEM_NAME),
    numeric(required(QUANTITY)),
    numeric(col(COST_PER_ITEM)),
    numeric(col(TOTAL_COST)),
    required(EVENT_TYPE),
    col(EVENT_NAME),
    col(DEPARTMENT),
    aliased(col(DISTRIBUTED_ON), &["Event_Date", "Distribution_Date"]),
    col(GIFT),
    aliased(col(DESCRIPTION), &["Notes"]),
    aliased(col(REQUEST_ID), &["Idempotency_Key"]),
];

const BUDGET_COLUMNS: &[Column] = &[required(EVENT_TYPE), numeric(col(ACTUAL_SPENT))];

/// Canonical form of a header for matching
fn normalize_header(header: &str) -> String {
    header.trim().to_ascii_lowercase().replace(' ', "_")
}

fn budget_amount_header(year: i32) -> String {
    format!("{}_Budget_Amount", year)
}

/// Year prefix of a `<YEAR>_Budget_Amount` header
fn budget_year_of(header: &str) -> Option<i32> {
    normalize_header(header)
        .strip_suffix(BUDGET_AMOUNT_SUFFIX)
        .filter(|prefix| prefix.len() == 4)
        .and_then(|prefix| prefix.parse().ok())
}

// ============================================================================
// Cell parsing
// ============================================================================

/// Parse a money amount, accepting a leading `$` and thousands separators
pub fn parse_money(value: &str) -> Result<Decimal, String> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| "not a number".to_string())
}

/// Parse a whole-number count, accepting `5` and `5.0`
pub fn parse_count(value: &str) -> Result<u32, String> {
    let number = parse_money(value)?;
    if number.fract() != Decimal::ZERO {
        return Err("not a whole number".to_string());
    }
    number
        .to_u32()
        .ok_or_else(|| "must be between 0 and 4294967295".to_string())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| parse_date_only(value).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .ok_or_else(|| "not a timestamp".to_string())
}

fn parse_date_only(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parse a date; a timestamp with a midnight time part is accepted too
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    parse_date_only(value)
        .or_else(|| {
            TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|ts| ts.date())
        })
        .ok_or_else(|| "not a date".to_string())
}

pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "gift" => Ok(true),
        "no" | "n" | "false" | "0" | "regular" => Ok(false),
        _ => Err("expected Yes or No".to_string()),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_flag(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

// ============================================================================
// Reading
// ============================================================================

/// Header positions for one sheet
struct Layout {
    table: TableKind,
    positions: HashMap<&'static str, usize>,
    extras: Vec<(usize, String)>,
}

impl Layout {
    fn resolve(table: TableKind, sheet: &Sheet, columns: &[Column]) -> Result<Self, SchemaError> {
        let by_name: HashMap<String, usize> = sheet
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.trim().is_empty())
            .map(|(idx, h)| (normalize_header(h), idx))
            .collect();

        let mut positions = HashMap::new();
        for column in columns {
            let found = std::iter::once(column.header)
                .chain(column.aliases.iter().copied())
                .find_map(|name| by_name.get(&normalize_header(name)).copied());
            match found {
                Some(idx) => {
                    positions.insert(column.header, idx);
                }
                None if column.required => {
                    return Err(SchemaError::MissingColumn {
                        table,
                        column: column.header.to_string(),
                    });
                }
                None => {}
            }
        }

        Ok(Self {
            table,
            positions,
            extras: Vec::new(),
        })
    }

    /// Everything not claimed by a known column is carried as an extra
    fn collect_extras(mut self, sheet: &Sheet, claimed: &[usize]) -> Self {
        let known: BTreeSet<usize> = self.positions.values().copied().chain(claimed.iter().copied()).collect();
        self.extras = sheet
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, h)| !known.contains(idx) && !h.trim().is_empty())
            .map(|(idx, h)| (idx, h.trim().to_string()))
            .collect();
        self
    }

    fn row<'a>(&'a self, number: usize, cells: &'a [String]) -> Cells<'a> {
        Cells {
            layout: self,
            number,
            cells,
        }
    }
}

/// One data row with typed accessors
struct Cells<'a> {
    layout: &'a Layout,
    /// Row number as shown in a spreadsheet (header is row 1)
    number: usize,
    cells: &'a [String],
}

impl<'a> Cells<'a> {
    fn raw_at(&self, idx: usize) -> Option<&'a str> {
        self.cells
            .get(idx)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn raw(&self, header: &'static str) -> Option<&'a str> {
        self.layout
            .positions
            .get(header)
            .and_then(|&idx| self.raw_at(idx))
    }

    fn invalid(&self, column: &str, value: &str, reason: String) -> SchemaError {
        SchemaError::InvalidCell {
            table: self.layout.table,
            row: self.number,
            column: column.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    fn text(&self, header: &'static str) -> Option<String> {
        self.raw(header).map(str::to_string)
    }

    fn required_text(&self, header: &'static str) -> Result<String, SchemaError> {
        self.text(header)
            .ok_or_else(|| self.invalid(header, "", "value is required".to_string()))
    }

    fn parsed<T>(
        &self,
        header: &'static str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Option<T>, SchemaError> {
        self.raw(header)
            .map(|value| parse(value).map_err(|reason| self.invalid(header, value, reason)))
            .transpose()
    }

    fn required_parsed<T>(
        &self,
        header: &'static str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T, SchemaError> {
        self.parsed(header, parse)?
            .ok_or_else(|| self.invalid(header, "", "value is required".to_string()))
    }

    fn extra(&self) -> BTreeMap<String, String> {
        self.layout
            .extras
            .iter()
            .filter_map(|(idx, header)| self.raw_at(*idx).map(|v| (header.clone(), v.to_string())))
            .collect()
    }
}

fn non_negative_money(value: &str) -> Result<Decimal, String> {
    let amount = parse_money(value)?;
    if amount < Decimal::ZERO {
        return Err("must not be negative".to_string());
    }
    Ok(amount)
}

fn positive_count(value: &str) -> Result<u32, String> {
    match parse_count(value)? {
        0 => Err("must be at least 1".to_string()),
        n => Ok(n),
    }
}

fn find_sheet<'a>(sheets: &'a [Sheet], table: TableKind) -> Result<&'a Sheet, SchemaError> {
    sheets
        .iter()
        .find(|s| s.name.trim().eq_ignore_ascii_case(table.sheet_name()))
        .ok_or(SchemaError::MissingTable(table))
}

/// An inflow row whose remaining quantity may still need deriving
pub(crate) struct InflowRow {
    pub record: InflowRecord,
    pub stored_quantity_left: Option<u32>,
}

/// A budget row with the spent figure as stored in the source
pub(crate) struct BudgetRow {
    pub record: BudgetRecord,
    pub stored_spent: Option<Decimal>,
}

/// Typed tables read from sheets, before ledger-wide integrity checks
pub(crate) struct ParsedTables {
    pub inflow: Vec<InflowRow>,
    pub outflow: Vec<OutflowRecord>,
    pub budget: Vec<BudgetRow>,
    pub budget_year: i32,
}

pub(crate) fn parse_sheets(sheets: &[Sheet]) -> Result<ParsedTables, SchemaError> {
    let inflow = read_inflow(find_sheet(sheets, TableKind::Inflow)?)?;
    let outflow = read_outflow(find_sheet(sheets, TableKind::Outflow)?)?;
    let (budget, budget_year) = read_budget(find_sheet(sheets, TableKind::Budget)?)?;
    Ok(ParsedTables {
        inflow,
        outflow,
        budget,
        budget_year,
    })
}

fn read_inflow(sheet: &Sheet) -> Result<Vec<InflowRow>, SchemaError> {
    let layout = Layout::resolve(TableKind::Inflow, sheet, INFLOW_COLUMNS)?.collect_extras(sheet, &[]);

    sheet
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<InflowRow, SchemaError> {
            let cells = layout.row(i + 2, row);
            let item_id = cells.required_text(ITEM_ID)?;
            let cost_per_item = cells.required_parsed(COST_PER_ITEM, non_negative_money)?;
            let quantity = cells.required_parsed(QUANTITY, positive_count)?;
            let total_cost = cost_per_item
                .checked_mul(Decimal::from(quantity))
                .ok_or_else(|| {
                    cells.invalid(
                        COST_PER_ITEM,
                        &cost_per_item.to_string(),
                        "total cost is too large".to_string(),
                    )
                })?;

            if let Some(stored) = cells.parsed(TOTAL_COST, parse_money)? {
                if stored != total_cost {
                    tracing::warn!(
                        "Inflow row {} ({}): stored Total_Cost {} replaced by {}",
                        cells.number,
                        item_id,
                        stored,
                        total_cost
                    );
                }
            }

            let record = InflowRecord {
                item_type: cells.required_text(ITEM_TYPE)?,
                item_name: cells.required_text(ITEM_NAME)?,
                cost_per_item,
                quantity,
                quantity_left: quantity,
                total_cost,
                code: cells.text(CODE),
                purchase_date: cells.parsed(PURCHASE_DATE, parse_date)?,
                vendor_name: cells.text(VENDOR_NAME),
                vendor_address: cells.text(VENDOR_ADDRESS),
                contact_name: cells.text(CONTACT_NAME),
                vendor_email: cells.text(VENDOR_EMAIL),
                vendor_phone: cells.text(VENDOR_PHONE),
                description: cells.text(DESCRIPTION),
                submitted_at: cells.parsed(SUBMITTED_AT, parse_timestamp)?,
                extra: cells.extra(),
                item_id,
            };

            Ok(InflowRow {
                stored_quantity_left: cells.parsed(QUANTITY_LEFT, parse_count)?,
                record,
            })
        })
        .collect()
}

fn read_outflow(sheet: &Sheet) -> Result<Vec<OutflowRecord>, SchemaError> {
    let layout =
        Layout::resolve(TableKind::Outflow, sheet, OUTFLOW_COLUMNS)?.collect_extras(sheet, &[]);

    sheet
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<OutflowRecord, SchemaError> {
            let cells = layout.row(i + 2, row);
            // Total_Cost is derived from the frozen cost; parse only to reject garbage
            cells.parsed(TOTAL_COST, parse_money)?;
            let quantity = cells.required_parsed(QUANTITY, positive_count)?;
            let cost_per_item = cells.parsed(COST_PER_ITEM, non_negative_money)?;
            if let Some(cost) = cost_per_item {
                if cost.checked_mul(Decimal::from(quantity)).is_none() {
                    return Err(cells.invalid(
                        COST_PER_ITEM,
                        &cost.to_string(),
                        "total cost is too large".to_string(),
                    ));
                }
            }

            Ok(OutflowRecord {
                item_id: cells.required_text(ITEM_ID)?,
                item_type: cells.text(ITEM_TYPE),
                item_name: cells.text(ITEM_NAME),
                quantity,
                cost_per_item,
                event_type: cells.required_text(EVENT_TYPE)?,
                event_name: cells.text(EVENT_NAME),
                department: cells.text(DEPARTMENT),
                distributed_on: cells.parsed(DISTRIBUTED_ON, parse_date)?,
                gift: cells.parsed(GIFT, parse_flag)?,
                notes: cells.text(DESCRIPTION),
                request_id: cells.text(REQUEST_ID),
                extra: cells.extra(),
            })
        })
        .collect()
}

fn read_budget(sheet: &Sheet) -> Result<(Vec<BudgetRow>, i32), SchemaError> {
    let (amount_idx, budget_year) = sheet
        .headers
        .iter()
        .enumerate()
        .find_map(|(idx, h)| budget_year_of(h).map(|year| (idx, year)))
        .ok_or_else(|| SchemaError::MissingColumn {
            table: TableKind::Budget,
            column: budget_amount_header(shared::DEFAULT_BUDGET_YEAR),
        })?;
    let amount_header = sheet.headers[amount_idx].trim().to_string();

    let layout =
        Layout::resolve(TableKind::Budget, sheet, BUDGET_COLUMNS)?.collect_extras(sheet, &[amount_idx]);

    let rows = sheet
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<BudgetRow, SchemaError> {
            let cells = layout.row(i + 2, row);
            let budget_amount = match cells.raw_at(amount_idx) {
                Some(value) => non_negative_money(value)
                    .map_err(|reason| cells.invalid(&amount_header, value, reason))?,
                None => Decimal::ZERO,
            };

            Ok(BudgetRow {
                record: BudgetRecord {
                    event_type: cells.required_text(EVENT_TYPE)?,
                    budget_amount,
                    actual_amount_spent: Decimal::ZERO,
                    extra: cells.extra(),
                },
                stored_spent: cells.parsed(ACTUAL_SPENT, parse_money)?,
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    Ok((rows, budget_year))
}

// ============================================================================
// Writing
// ============================================================================

/// Sheet builder that appends extra columns after the known ones
struct SheetWriter {
    sheet: Sheet,
    extra_headers: Vec<String>,
}

impl SheetWriter {
    fn new<'a>(
        table: TableKind,
        columns: Vec<(String, bool)>,
        extras: impl Iterator<Item = &'a BTreeMap<String, String>>,
    ) -> Self {
        let extra_headers: Vec<String> = extras
            .flat_map(|extra| extra.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut sheet = Sheet {
            name: table.sheet_name().to_string(),
            ..Default::default()
        };
        for (idx, (header, is_numeric)) in columns.into_iter().enumerate() {
            if is_numeric {
                sheet.numeric_columns.insert(idx);
            }
            sheet.headers.push(header);
        }
        sheet.headers.extend(extra_headers.iter().cloned());

        Self {
            sheet,
            extra_headers,
        }
    }

    fn push(&mut self, mut cells: Vec<String>, extra: &BTreeMap<String, String>) {
        cells.extend(
            self.extra_headers
                .iter()
                .map(|h| extra.get(h).cloned().unwrap_or_default()),
        );
        self.sheet.rows.push(cells);
    }

    fn finish(self) -> Sheet {
        self.sheet
    }
}

fn known_columns(columns: &[Column]) -> Vec<(String, bool)> {
    columns
        .iter()
        .map(|c| (c.header.to_string(), c.numeric))
        .collect()
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_with<T>(value: Option<T>, format: impl Fn(T) -> String) -> String {
    value.map(format).unwrap_or_default()
}

/// Render a snapshot as Inflow, Outflow and Budget sheets, derived columns included
pub fn snapshot_to_sheets(snapshot: &LedgerSnapshot) -> Vec<Sheet> {
    let mut inflow = SheetWriter::new(
        TableKind::Inflow,
        known_columns(INFLOW_COLUMNS),
        snapshot.inflow.iter().map(|r| &r.extra),
    );
    for r in &snapshot.inflow {
        inflow.push(
            vec![
                r.item_id.clone(),
                r.item_type.clone(),
                r.item_name.clone(),
                r.cost_per_item.to_string(),
                r.quantity.to_string(),
                r.quantity_left.to_string(),
                r.total_cost.to_string(),
                opt(&r.code),
                opt_with(r.purchase_date, format_date),
                opt(&r.vendor_name),
                opt(&r.vendor_address),
                opt(&r.contact_name),
                opt(&r.vendor_email),
                opt(&r.vendor_phone),
                opt(&r.description),
                opt_with(r.submitted_at, format_timestamp),
            ],
            &r.extra,
        );
    }

    let mut outflow = SheetWriter::new(
        TableKind::Outflow,
        known_columns(OUTFLOW_COLUMNS),
        snapshot.outflow.iter().map(|r| &r.extra),
    );
    for r in &snapshot.outflow {
        outflow.push(
            vec![
                r.item_id.clone(),
                opt(&r.item_type),
                opt(&r.item_name),
                r.quantity.to_string(),
                opt_with(r.cost_per_item, |c| c.to_string()),
                opt_with(r.total_cost(), |c| c.to_string()),
                r.event_type.clone(),
                opt(&r.event_name),
                opt(&r.department),
                opt_with(r.distributed_on, format_date),
                opt_with(r.gift, format_flag),
                opt(&r.notes),
                opt(&r.request_id),
            ],
            &r.extra,
        );
    }

    let mut budget_columns = known_columns(BUDGET_COLUMNS);
    budget_columns.insert(1, (budget_amount_header(snapshot.budget_year), true));
    let mut budget = SheetWriter::new(
        TableKind::Budget,
        budget_columns,
        snapshot.budget.iter().map(|r| &r.extra),
    );
    for r in &snapshot.budget {
        budget.push(
            vec![
                r.event_type.clone(),
                r.budget_amount.to_string(),
                r.actual_amount_spent.to_string(),
            ],
            &r.extra,
        );
    }

    vec![inflow.finish(), outflow.finish(), budget.finish()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
        Sheet::from_rows(
            name,
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_from_rows_trims_and_drops_blank_rows() {
        let s = sheet("Inflow", &[&[" Item_ID ", "Quantity"], &["A", " 3 "], &["", ""]]);
        assert_eq!(s.headers, ["Item_ID", "Quantity"]);
        assert_eq!(s.rows, vec![vec!["A".to_string(), "3".to_string()]]);
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$1,234.50"), Ok(Decimal::new(123450, 2)));
        assert_eq!(parse_money("10"), Ok(Decimal::TEN));
        assert!(parse_money("ten").is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("5"), Ok(5));
        assert_eq!(parse_count("5.0"), Ok(5));
        assert!(parse_count("2.5").is_err());
        assert!(parse_count("-1").is_err());
    }

    #[test]
    fn test_parse_dates_in_every_layout() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(parse_date("2025-01-31"), Ok(expected));
        assert_eq!(parse_date("31/01/2025"), Ok(expected));
        assert_eq!(parse_date("2025-01-31 00:00:00"), Ok(expected));
        assert!(parse_date("Jan 31").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("Yes"), Ok(true));
        assert_eq!(parse_flag("no"), Ok(false));
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_budget_year_from_header() {
        assert_eq!(budget_year_of("2025_Budget_Amount"), Some(2025));
        assert_eq!(budget_year_of("2026_budget_amount"), Some(2026));
        assert_eq!(budget_year_of("Budget_Amount"), None);
    }

    #[test]
    fn test_header_aliases_resolve() {
        let inflow = sheet(
            "Inflow",
            &[
                &["Item_ID", "Item_Type", "Item_name", "Cost_per_Item", "Quantity"],
                &["I1", "S", "Mug", "4", "2"],
            ],
        );
        let rows = read_inflow(&inflow).unwrap();
        assert_eq!(rows[0].record.item_name, "Mug");
        assert_eq!(rows[0].stored_quantity_left, None);

        let outflow = sheet(
            "Outflow",
            &[
                &["Item_ID", "Quantity", "Event_type", "Event_Date", "Notes"],
                &["I1", "1", "Fair", "2025-02-03", "front desk"],
            ],
        );
        let rows = read_outflow(&outflow).unwrap();
        assert_eq!(rows[0].event_type, "Fair");
        assert_eq!(rows[0].distributed_on, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(rows[0].notes.as_deref(), Some("front desk"));
    }

    #[test]
    fn test_missing_required_column() {
        let inflow = sheet("Inflow", &[&["Item_ID", "Item_Type", "Item_Name", "Quantity"]]);
        assert_eq!(
            read_inflow(&inflow).err(),
            Some(SchemaError::MissingColumn {
                table: TableKind::Inflow,
                column: COST_PER_ITEM.to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_cell_reports_row_and_column() {
        let inflow = sheet(
            "Inflow",
            &[
                &["Item_ID", "Item_Type", "Item_Name", "Cost_per_Item", "Quantity"],
                &["I1", "S", "Mug", "4", "2"],
                &["I2", "S", "Cap", "abc", "2"],
            ],
        );
        match read_inflow(&inflow) {
            Err(SchemaError::InvalidCell { row, column, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, COST_PER_ITEM);
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_unknown_columns_are_kept() {
        let budget = sheet(
            "Budget",
            &[
                &["Event_Type", "2024_Budget_Amount", "Owner"],
                &["Fair", "100", "Dana"],
            ],
        );
        let (rows, year) = read_budget(&budget).unwrap();
        assert_eq!(year, 2024);
        assert_eq!(rows[0].record.extra.get("Owner").map(String::as_str), Some("Dana"));
        assert_eq!(rows[0].stored_spent, None);
    }

    #[test]
    fn test_missing_table() {
        let sheets = vec![
            sheet("Inflow", &[&["Item_ID", "Item_Type", "Item_Name", "Cost_per_Item", "Quantity"]]),
            sheet("Budget", &[&["Event_Type", "2025_Budget_Amount"]]),
        ];
        assert_eq!(
            parse_sheets(&sheets).err(),
            Some(SchemaError::MissingTable(TableKind::Outflow))
        );
    }

    #[test]
    fn test_written_sheets_mark_numeric_columns() {
        let sheets = snapshot_to_sheets(&LedgerSnapshot::empty());
        assert_eq!(sheets.len(), 3);
        assert_eq!(sheets[2].headers, ["Event_Type", "2025_Budget_Amount", "Actual_Amount_Spent"]);
        assert!(sheets[2].is_numeric(1));
        assert!(!sheets[0].is_numeric(0));
        assert!(sheets[0].is_numeric(3));
    }
}
