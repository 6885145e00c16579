//! In-memory inventory ledger
//!
//! Holds the Inflow, Outflow and Budget tables and applies every mutation as
//! validate-then-apply: all checks run against the current state before any
//! table is touched, so a rejected operation leaves the ledger unchanged.

pub mod schema;

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::report::spent_by_event_type;
use shared::{
    validate_budget_amount, validate_distribution, validate_purchase, validate_required,
    BudgetRecord, DistributionInput, InflowRecord, LedgerSnapshot, OutflowRecord, PurchaseInput,
    TableKind, Violation,
};

use crate::error::{LedgerError, LedgerResult, SchemaError};
use schema::InflowRow;
pub use schema::Sheet;

/// Read-only view of one table
#[derive(Debug, Serialize)]
#[serde(tag = "table", content = "rows", rename_all = "lowercase")]
pub enum TableView<'a> {
    Inflow(&'a [InflowRecord]),
    Outflow(&'a [OutflowRecord]),
    Budget(&'a [BudgetRecord]),
}

impl TableView<'_> {
    pub fn len(&self) -> usize {
        match self {
            TableView::Inflow(rows) => rows.len(),
            TableView::Outflow(rows) => rows.len(),
            TableView::Budget(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a distribution, fresh or replayed
#[derive(Debug, Clone, Serialize)]
pub struct DistributionOutcome {
    pub record: OutflowRecord,
    /// Remaining quantity of the distributed item after the distribution
    pub quantity_left: u32,
    /// True when the request ID matched an earlier identical distribution
    pub replayed: bool,
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    inflow: Vec<InflowRecord>,
    outflow: Vec<OutflowRecord>,
    budget: Vec<BudgetRecord>,
    budget_year: i32,
    revision: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            inflow: Vec::new(),
            outflow: Vec::new(),
            budget: Vec::new(),
            budget_year: shared::DEFAULT_BUDGET_YEAR,
            revision: 0,
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from raw sheets, checking cross-table integrity.
    ///
    /// `Quantity_Left` is always re-derived as purchased quantity minus
    /// everything distributed for the item; a stored value that disagrees is
    /// replaced with a warning.
    pub fn from_sheets(sheets: &[Sheet]) -> Result<Self, SchemaError> {
        let parsed = schema::parse_sheets(sheets)?;

        let stored_spent: Vec<Option<Decimal>> =
            parsed.budget.iter().map(|row| row.stored_spent).collect();
        let budget = parsed.budget.into_iter().map(|row| row.record).collect();

        let ledger = Self::from_tables(parsed.inflow, parsed.outflow, budget, parsed.budget_year, 0)?;

        for (line, stored) in ledger.budget.iter().zip(stored_spent) {
            if let Some(stored) = stored {
                if stored != line.actual_amount_spent {
                    tracing::warn!(
                        "Budget {}: stored Actual_Amount_Spent {} replaced by {}",
                        line.event_type,
                        stored,
                        line.actual_amount_spent
                    );
                }
            }
        }

        Ok(ledger)
    }

    /// Rebuild a ledger from a snapshot, re-running the integrity checks
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, SchemaError> {
        let inflow = snapshot
            .inflow
            .into_iter()
            .map(|record| InflowRow {
                stored_quantity_left: Some(record.quantity_left),
                record,
            })
            .collect();
        Self::from_tables(
            inflow,
            snapshot.outflow,
            snapshot.budget,
            snapshot.budget_year,
            snapshot.revision,
        )
    }

    fn from_tables(
        inflow: Vec<InflowRow>,
        outflow: Vec<OutflowRecord>,
        budget: Vec<BudgetRecord>,
        budget_year: i32,
        revision: u64,
    ) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for (i, row) in inflow.iter().enumerate() {
            let item = &row.record;
            if !seen.insert(item.item_id.as_str()) {
                return Err(SchemaError::DuplicateKey {
                    table: TableKind::Inflow,
                    key: item.item_id.clone(),
                });
            }
            if item.quantity == 0 {
                return Err(SchemaError::QuantityOutOfBounds {
                    item_id: item.item_id.clone(),
                    reason: "purchased quantity must be at least 1".to_string(),
                });
            }
            if let Some(stored) = row.stored_quantity_left {
                if stored > item.quantity {
                    return Err(SchemaError::QuantityOutOfBounds {
                        item_id: item.item_id.clone(),
                        reason: format!(
                            "quantity left {} exceeds purchased quantity {}",
                            stored, item.quantity
                        ),
                    });
                }
            }
            if item.computed_total().is_none() {
                return Err(total_overflow(TableKind::Inflow, i, item.cost_per_item));
            }
        }

        let mut distributed: HashMap<&str, u64> = HashMap::new();
        for (i, row) in outflow.iter().enumerate() {
            if !seen.contains(row.item_id.as_str()) {
                return Err(SchemaError::UnknownItem {
                    row: i + 2,
                    item_id: row.item_id.clone(),
                });
            }
            if row.quantity == 0 {
                return Err(SchemaError::QuantityOutOfBounds {
                    item_id: row.item_id.clone(),
                    reason: format!("outflow row {} distributes nothing", i + 2),
                });
            }
            if let (Some(cost), None) = (row.cost_per_item, row.total_cost()) {
                return Err(total_overflow(TableKind::Outflow, i, cost));
            }
            *distributed.entry(row.item_id.as_str()).or_default() += u64::from(row.quantity);
        }

        let mut records = Vec::with_capacity(inflow.len());
        for row in &inflow {
            let mut item = row.record.clone();
            let used = distributed.get(item.item_id.as_str()).copied().unwrap_or(0);
            let left = u64::from(item.quantity)
                .checked_sub(used)
                .and_then(|left| u32::try_from(left).ok())
                .ok_or_else(|| SchemaError::QuantityOutOfBounds {
                    item_id: item.item_id.clone(),
                    reason: format!(
                        "distributed {} exceeds purchased quantity {}",
                        used, item.quantity
                    ),
                })?;
            if let Some(stored) = row.stored_quantity_left {
                if stored != left {
                    tracing::warn!(
                        "Item {}: stored Quantity_Left {} replaced by {} ({} purchased, {} distributed)",
                        item.item_id,
                        stored,
                        left,
                        item.quantity,
                        used
                    );
                }
            }
            item.quantity_left = left;
            item.total_cost = item.computed_total().unwrap_or(item.total_cost);
            records.push(item);
        }
        let inflow = records;

        let mut event_types = HashSet::new();
        for line in &budget {
            if !event_types.insert(line.event_type.as_str()) {
                return Err(SchemaError::DuplicateKey {
                    table: TableKind::Budget,
                    key: line.event_type.clone(),
                });
            }
        }

        let mut ledger = Self {
            inflow,
            outflow,
            budget,
            budget_year,
            revision,
        };
        ledger.refresh_budget_actuals();
        Ok(ledger)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn budget_year(&self) -> i32 {
        self.budget_year
    }

    pub fn inflow(&self) -> &[InflowRecord] {
        &self.inflow
    }

    pub fn outflow(&self) -> &[OutflowRecord] {
        &self.outflow
    }

    pub fn budget(&self) -> &[BudgetRecord] {
        &self.budget
    }

    pub fn get(&self, table: TableKind) -> TableView<'_> {
        match table {
            TableKind::Inflow => TableView::Inflow(&self.inflow),
            TableKind::Outflow => TableView::Outflow(&self.outflow),
            TableKind::Budget => TableView::Budget(&self.budget),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            revision: self.revision,
            budget_year: self.budget_year,
            inflow: self.inflow.clone(),
            outflow: self.outflow.clone(),
            budget: self.budget.clone(),
        }
    }

    pub fn to_sheets(&self) -> Vec<Sheet> {
        schema::snapshot_to_sheets(&self.snapshot())
    }

    pub fn find_item(&self, item_id: &str) -> Option<&InflowRecord> {
        self.inflow.iter().find(|r| r.item_id == item_id)
    }

    /// Items with stock left, in inflow order
    pub fn available_items(&self) -> Vec<&InflowRecord> {
        self.inflow.iter().filter(|r| r.is_available()).collect()
    }

    /// Keep revisions increasing across a reload that replaced this ledger
    pub fn continue_after(&mut self, previous_revision: u64) {
        self.revision = self.revision.max(previous_revision + 1);
    }

    /// Record a purchase. `now` stamps the submission and seeds a generated ID.
    pub fn purchase(&mut self, input: PurchaseInput, now: NaiveDateTime) -> LedgerResult<InflowRecord> {
        let input = trim_purchase(input);
        let mut violations = validate_purchase(&input);

        let supplied_id = input.item_id.clone();
        if let Some(id) = &supplied_id {
            if self.find_item(id).is_some() {
                violations.push(Violation::new(
                    "item_id",
                    format!("Item ID {} already exists", id),
                ));
            }
        }
        if !violations.is_empty() {
            return Err(LedgerError::Validation(violations));
        }

        let quantity = u32::try_from(input.quantity)
            .map_err(|_| LedgerError::validation("quantity", "Quantity is out of range"))?;
        let total_cost = input
            .cost_per_item
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| LedgerError::validation("cost_per_item", "Total cost is too large"))?;
        let item_id = supplied_id.unwrap_or_else(|| self.generate_item_id(now));

        let record = InflowRecord {
            item_id,
            item_type: input.item_type,
            item_name: input.item_name,
            cost_per_item: input.cost_per_item,
            quantity,
            quantity_left: quantity,
            total_cost,
            code: input.code,
            purchase_date: Some(input.purchase_date.unwrap_or_else(|| now.date())),
            vendor_name: Some(input.vendor_name),
            vendor_address: input.vendor_address,
            contact_name: input.contact_name,
            vendor_email: input.vendor_email,
            vendor_phone: input.vendor_phone,
            description: input.description,
            submitted_at: Some(now),
            extra: Default::default(),
        };

        self.inflow.push(record.clone());
        self.revision += 1;
        tracing::debug!(
            "Recorded purchase {} ({} x {})",
            record.item_id,
            record.quantity,
            record.item_name
        );
        Ok(record)
    }

    /// Timestamp-based ID, suffixed `-2`, `-3`, ... until unique
    fn generate_item_id(&self, now: NaiveDateTime) -> String {
        let base = now.format("%y%m%d%H%M%S").to_string();
        if self.find_item(&base).is_none() {
            return base;
        }
        let mut suffix = 2u64;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if self.find_item(&candidate).is_none() {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Distribute items from an existing purchase.
    ///
    /// Checks run in order: request-ID replay, expected revision, field
    /// validation, item lookup, stock. `today` dates the row when the input
    /// carries no distribution date.
    pub fn distribute(
        &mut self,
        input: DistributionInput,
        today: NaiveDate,
    ) -> LedgerResult<DistributionOutcome> {
        let input = trim_distribution(input);

        if let Some(request_id) = input.request_id.as_deref() {
            if let Some(existing) = self
                .outflow
                .iter()
                .find(|row| row.request_id.as_deref() == Some(request_id))
            {
                if !existing.matches_request(&input) {
                    return Err(LedgerError::Concurrency(format!(
                        "request {} was already used for a different distribution",
                        request_id
                    )));
                }
                tracing::info!("Replayed distribution request {}", request_id);
                return Ok(DistributionOutcome {
                    quantity_left: self
                        .find_item(&existing.item_id)
                        .map(|item| item.quantity_left)
                        .unwrap_or_default(),
                    record: existing.clone(),
                    replayed: true,
                    revision: self.revision,
                });
            }
        }

        if let Some(expected) = input.expected_revision {
            if expected != self.revision {
                return Err(LedgerError::Concurrency(format!(
                    "ledger is at revision {}, request expected {}",
                    self.revision, expected
                )));
            }
        }

        let violations = validate_distribution(&input);
        if !violations.is_empty() {
            return Err(LedgerError::Validation(violations));
        }
        let quantity = u32::try_from(input.quantity)
            .map_err(|_| LedgerError::validation("quantity", "Quantity is out of range"))?;

        let idx = self
            .inflow
            .iter()
            .position(|r| r.item_id == input.item_id)
            .ok_or_else(|| LedgerError::item_not_found(&input.item_id))?;
        let item = &self.inflow[idx];
        if quantity > item.quantity_left {
            return Err(LedgerError::InsufficientStock {
                item_id: item.item_id.clone(),
                requested: quantity,
                available: item.quantity_left,
            });
        }

        let record = OutflowRecord {
            item_id: item.item_id.clone(),
            item_type: Some(item.item_type.clone()),
            item_name: Some(item.item_name.clone()),
            quantity,
            cost_per_item: Some(item.cost_per_item),
            event_type: input.event_type,
            event_name: Some(input.event_name),
            department: Some(input.department),
            distributed_on: Some(input.distribution_date.unwrap_or(today)),
            gift: input.gift,
            notes: input.notes,
            request_id: input.request_id,
            extra: Default::default(),
        };

        let item = &mut self.inflow[idx];
        item.quantity_left -= quantity;
        let quantity_left = item.quantity_left;
        self.outflow.push(record.clone());
        self.refresh_budget_actuals();
        self.revision += 1;

        tracing::debug!(
            "Distributed {} of {} to {} ({} left)",
            quantity,
            record.item_id,
            record.event_type,
            quantity_left
        );
        Ok(DistributionOutcome {
            record,
            quantity_left,
            replayed: false,
            revision: self.revision,
        })
    }

    /// Remove a purchase that nothing has been distributed from
    pub fn delete_purchase(&mut self, item_id: &str) -> LedgerResult<InflowRecord> {
        let item_id = item_id.trim();
        let idx = self
            .inflow
            .iter()
            .position(|r| r.item_id == item_id)
            .ok_or_else(|| LedgerError::item_not_found(item_id))?;

        let references = self.outflow.iter().filter(|o| o.item_id == item_id).count();
        if references > 0 {
            return Err(LedgerError::validation(
                "item_id",
                format!(
                    "Item {} has {} distribution(s) and cannot be deleted",
                    item_id, references
                ),
            ));
        }

        let removed = self.inflow.remove(idx);
        self.revision += 1;
        tracing::debug!("Deleted purchase {}", removed.item_id);
        Ok(removed)
    }

    /// Create or update the budget line for an event type
    pub fn set_budget(&mut self, event_type: &str, amount: Decimal) -> LedgerResult<BudgetRecord> {
        let event_type = event_type.trim();
        let mut violations = Vec::new();
        if let Err(msg) = validate_required(event_type) {
            violations.push(Violation::new("event_type", msg));
        }
        if let Err(msg) = validate_budget_amount(amount) {
            violations.push(Violation::new("budget_amount", msg));
        }
        if !violations.is_empty() {
            return Err(LedgerError::Validation(violations));
        }

        match self.budget.iter_mut().find(|b| b.event_type == event_type) {
            Some(line) => line.budget_amount = amount,
            None => self.budget.push(BudgetRecord::new(event_type, amount)),
        }
        self.refresh_budget_actuals();
        self.revision += 1;

        self.budget
            .iter()
            .find(|b| b.event_type == event_type)
            .cloned()
            .ok_or_else(|| LedgerError::Internal(format!("budget line {} vanished", event_type)))
    }

    pub fn remove_budget(&mut self, event_type: &str) -> LedgerResult<BudgetRecord> {
        let event_type = event_type.trim();
        let idx = self
            .budget
            .iter()
            .position(|b| b.event_type == event_type)
            .ok_or_else(|| LedgerError::NotFound {
                resource: "Budget line",
                key: event_type.to_string(),
            })?;
        let removed = self.budget.remove(idx);
        self.revision += 1;
        Ok(removed)
    }

    /// Recompute each budget line's spend from the outflow table
    fn refresh_budget_actuals(&mut self) {
        let spent = spent_by_event_type(&self.outflow);
        for line in &mut self.budget {
            line.actual_amount_spent = spent
                .get(&line.event_type)
                .copied()
                .unwrap_or(Decimal::ZERO);
        }
    }
}

fn total_overflow(table: TableKind, index: usize, cost: Decimal) -> SchemaError {
    SchemaError::InvalidCell {
        table,
        row: index + 2,
        column: "Cost_per_Item".to_string(),
        value: cost.to_string(),
        reason: "total cost is too large".to_string(),
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trim_purchase(input: PurchaseInput) -> PurchaseInput {
    PurchaseInput {
        item_id: trim_optional(input.item_id),
        item_type: input.item_type.trim().to_string(),
        item_name: input.item_name.trim().to_string(),
        code: trim_optional(input.code),
        vendor_name: input.vendor_name.trim().to_string(),
        vendor_address: trim_optional(input.vendor_address),
        contact_name: trim_optional(input.contact_name),
        vendor_email: trim_optional(input.vendor_email),
        vendor_phone: trim_optional(input.vendor_phone),
        description: trim_optional(input.description),
        ..input
    }
}

fn trim_distribution(input: DistributionInput) -> DistributionInput {
    DistributionInput {
        item_id: input.item_id.trim().to_string(),
        event_type: input.event_type.trim().to_string(),
        event_name: input.event_name.trim().to_string(),
        department: input.department.trim().to_string(),
        notes: trim_optional(input.notes),
        request_id: trim_optional(input.request_id),
        ..input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn today() -> NaiveDate {
        now().date()
    }

    fn purchase(id: &str, cost: i64, quantity: i64) -> PurchaseInput {
        PurchaseInput {
            item_id: Some(id.to_string()),
            item_type: "M".to_string(),
            item_name: "T-shirt".to_string(),
            cost_per_item: Decimal::new(cost, 0),
            quantity,
            vendor_name: "Acme".to_string(),
            ..Default::default()
        }
    }

    fn distribution(id: &str, quantity: i64, event_type: &str) -> DistributionInput {
        DistributionInput {
            item_id: id.to_string(),
            quantity,
            event_type: event_type.to_string(),
            event_name: "Spring Fair".to_string(),
            department: "Admissions".to_string(),
            ..Default::default()
        }
    }

    fn stocked() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.purchase(purchase("I1", 5, 10), now()).unwrap();
        ledger.set_budget("Fair", Decimal::new(100, 0)).unwrap();
        ledger
    }

    #[test]
    fn test_purchase_sets_derived_columns() {
        let mut ledger = Ledger::new();
        let record = ledger.purchase(purchase("I1", 5, 10), now()).unwrap();
        assert_eq!(record.total_cost, Decimal::new(50, 0));
        assert_eq!(record.quantity_left, 10);
        assert_eq!(record.purchase_date, Some(today()));
        assert_eq!(record.submitted_at, Some(now()));
        assert_eq!(ledger.revision(), 1);
    }

    #[test]
    fn test_purchase_generates_unique_ids() {
        let mut ledger = Ledger::new();
        let mut input = purchase("", 1, 1);
        input.item_id = None;
        let first = ledger.purchase(input.clone(), now()).unwrap();
        let second = ledger.purchase(input.clone(), now()).unwrap();
        let third = ledger.purchase(input, now()).unwrap();
        assert_eq!(first.item_id, "250314092653");
        assert_eq!(second.item_id, "250314092653-2");
        assert_eq!(third.item_id, "250314092653-3");
    }

    #[test]
    fn test_purchase_rejects_duplicate_id_and_collects_violations() {
        let mut ledger = stocked();
        let mut input = purchase("I1", -1, 0);
        input.item_name = "  ".to_string();
        let err = ledger.purchase(input, now()).unwrap_err();
        match err {
            LedgerError::Validation(violations) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
                assert!(fields.contains(&"item_id"));
                assert!(fields.contains(&"item_name"));
                assert!(fields.contains(&"cost_per_item"));
                assert!(fields.contains(&"quantity"));
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert_eq!(ledger.inflow().len(), 1);
        assert_eq!(ledger.revision(), 2);
    }

    #[test]
    fn test_distribute_decrements_stock_and_updates_budget() {
        let mut ledger = stocked();
        let outcome = ledger.distribute(distribution("I1", 3, "Fair"), today()).unwrap();

        assert_eq!(outcome.quantity_left, 7);
        assert!(!outcome.replayed);
        assert_eq!(outcome.record.cost_per_item, Some(Decimal::new(5, 0)));
        assert_eq!(outcome.record.distributed_on, Some(today()));
        assert_eq!(ledger.find_item("I1").unwrap().quantity_left, 7);
        assert_eq!(ledger.budget()[0].actual_amount_spent, Decimal::new(15, 0));
        assert_eq!(ledger.budget()[0].utilization_percent(), Some(Decimal::new(15, 0)));
    }

    #[test]
    fn test_distribute_exact_remaining_stock() {
        let mut ledger = stocked();
        let outcome = ledger.distribute(distribution("I1", 10, "Fair"), today()).unwrap();
        assert_eq!(outcome.quantity_left, 0);
        assert!(ledger.available_items().is_empty());
    }

    #[test]
    fn test_distribute_insufficient_stock_leaves_ledger_unchanged() {
        let mut ledger = stocked();
        let before = ledger.snapshot();
        let err = ledger.distribute(distribution("I1", 11, "Fair"), today()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock { requested: 11, available: 10, .. }
        ));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_distribute_unknown_item() {
        let mut ledger = stocked();
        let err = ledger.distribute(distribution("NOPE", 1, "Fair"), today()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn test_distribute_to_event_without_budget_line() {
        let mut ledger = stocked();
        ledger.distribute(distribution("I1", 2, "Gala"), today()).unwrap();
        assert_eq!(ledger.budget().len(), 1);
        assert_eq!(ledger.budget()[0].actual_amount_spent, Decimal::ZERO);
    }

    #[test]
    fn test_frozen_cost_survives_new_purchases() {
        let mut ledger = stocked();
        ledger.distribute(distribution("I1", 2, "Fair"), today()).unwrap();
        ledger.purchase(purchase("I2", 50, 1), now()).unwrap();
        assert_eq!(ledger.outflow()[0].total_cost(), Some(Decimal::new(10, 0)));
    }

    #[test]
    fn test_replay_with_same_request_id() {
        let mut ledger = stocked();
        let mut input = distribution("I1", 4, "Fair");
        input.request_id = Some("req-1".to_string());

        let first = ledger.distribute(input.clone(), today()).unwrap();
        let revision = ledger.revision();
        let replay = ledger.distribute(input, today()).unwrap();

        assert!(replay.replayed);
        assert_eq!(replay.record, first.record);
        assert_eq!(replay.quantity_left, 6);
        assert_eq!(ledger.outflow().len(), 1);
        assert_eq!(ledger.revision(), revision);
    }

    #[test]
    fn test_request_id_reuse_with_different_payload() {
        let mut ledger = stocked();
        let mut input = distribution("I1", 4, "Fair");
        input.request_id = Some("req-1".to_string());
        ledger.distribute(input.clone(), today()).unwrap();

        input.quantity = 5;
        let err = ledger.distribute(input, today()).unwrap_err();
        assert!(matches!(err, LedgerError::Concurrency(_)));
        assert_eq!(ledger.find_item("I1").unwrap().quantity_left, 6);
    }

    #[test]
    fn test_stale_expected_revision() {
        let mut ledger = stocked();
        let mut input = distribution("I1", 1, "Fair");
        input.expected_revision = Some(ledger.revision() - 1);
        assert!(matches!(
            ledger.distribute(input.clone(), today()),
            Err(LedgerError::Concurrency(_))
        ));

        input.expected_revision = Some(ledger.revision());
        assert!(ledger.distribute(input, today()).is_ok());
    }

    #[test]
    fn test_delete_purchase_only_without_distributions() {
        let mut ledger = stocked();
        ledger.purchase(purchase("I2", 1, 1), now()).unwrap();
        ledger.distribute(distribution("I1", 1, "Fair"), today()).unwrap();

        assert!(matches!(
            ledger.delete_purchase("I1"),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.delete_purchase("I2").unwrap().item_id, "I2");
        assert!(matches!(
            ledger.delete_purchase("I2"),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_set_and_remove_budget() {
        let mut ledger = stocked();
        ledger.distribute(distribution("I1", 2, "Gala"), today()).unwrap();

        let line = ledger.set_budget("Gala", Decimal::new(40, 0)).unwrap();
        assert_eq!(line.actual_amount_spent, Decimal::new(10, 0));

        let line = ledger.set_budget("Gala", Decimal::new(20, 0)).unwrap();
        assert_eq!(line.budget_amount, Decimal::new(20, 0));
        assert_eq!(ledger.budget().len(), 2);

        assert!(ledger.set_budget("Gala", Decimal::new(-1, 0)).is_err());
        assert_eq!(ledger.remove_budget("Gala").unwrap().event_type, "Gala");
        assert!(matches!(
            ledger.remove_budget("Gala"),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trip_keeps_revision() {
        let mut ledger = stocked();
        ledger.distribute(distribution("I1", 2, "Fair"), today()).unwrap();
        let snapshot = ledger.snapshot();
        let restored = Ledger::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_with_unknown_outflow_item_is_rejected() {
        let mut snapshot = stocked().snapshot();
        snapshot.outflow.push(OutflowRecord {
            item_id: "GHOST".to_string(),
            item_type: None,
            item_name: None,
            quantity: 1,
            cost_per_item: None,
            event_type: "Fair".to_string(),
            event_name: None,
            department: None,
            distributed_on: None,
            gift: None,
            notes: None,
            request_id: None,
            extra: Default::default(),
        });
        assert_eq!(
            Ledger::from_snapshot(snapshot).err(),
            Some(SchemaError::UnknownItem {
                row: 2,
                item_id: "GHOST".to_string()
            })
        );
    }

    #[test]
    fn test_snapshot_with_stale_quantity_left_is_rederived() {
        let mut ledger = stocked();
        ledger.distribute(distribution("I1", 8, "Fair"), today()).unwrap();
        let mut snapshot = ledger.snapshot();
        snapshot.inflow[0].quantity_left = 10;

        let mut restored = Ledger::from_snapshot(snapshot).unwrap();
        assert_eq!(restored.inflow()[0].quantity_left, 2);

        let err = restored.distribute(distribution("I1", 10, "Fair"), today()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock { requested: 10, available: 2, .. }
        ));
    }

    #[test]
    fn test_purchase_with_overflowing_total_is_rejected() {
        let mut ledger = stocked();
        let before = ledger.snapshot();
        let input = PurchaseInput {
            cost_per_item: Decimal::MAX,
            ..purchase("I2", 0, 2)
        };

        match ledger.purchase(input, now()) {
            Err(LedgerError::Validation(violations)) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "cost_per_item");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_snapshot_with_overflowing_total_is_rejected() {
        let mut snapshot = stocked().snapshot();
        snapshot.inflow[0].cost_per_item = Decimal::MAX;
        assert!(matches!(
            Ledger::from_snapshot(snapshot),
            Err(SchemaError::InvalidCell { table: TableKind::Inflow, row: 2, .. })
        ));
    }

    #[test]
    fn test_continue_after_reload() {
        let mut ledger = Ledger::new();
        ledger.continue_after(7);
        assert_eq!(ledger.revision(), 8);
    }

    #[test]
    fn test_table_view_serializes_with_tag() {
        let ledger = stocked();
        let json = serde_json::to_value(ledger.get(TableKind::Budget)).unwrap();
        assert_eq!(json["table"], "budget");
        assert_eq!(json["rows"][0]["event_type"], "Fair");
    }
}
