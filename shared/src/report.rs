//! Read-only aggregation over a ledger snapshot
//!
//! Every function here is pure. Groups are listed in the order their key
//! first appears in the underlying table; rankings sort descending by their
//! metric and keep insertion order for ties.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{LedgerSnapshot, OutflowRecord};
use crate::types::{utilization_percent, ReportThresholds};

/// Department label used for distributions that did not name one
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Purchases and distributions for one item type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTypeSummary {
    pub item_type: String,
    pub purchase_count: u64,
    pub purchased_quantity: u64,
    pub quantity_left: u64,
    pub total_purchases: Decimal,
    pub distribution_count: u64,
    pub distributed_quantity: u64,
    pub total_distributions: Decimal,
}

/// Budget against distributions for one event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeSummary {
    pub event_type: String,
    pub budget_amount: Decimal,
    pub actual_spent: Decimal,
    pub remaining: Decimal,
    pub utilization_percent: Option<Decimal>,
    pub distribution_count: u64,
    pub distributed_quantity: u64,
}

/// Distributions received by one department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub distribution_count: u64,
    pub total_items: u64,
    pub total_value: Decimal,
}

/// Purchases in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPurchaseSummary {
    /// `YYYY-MM`
    pub month: String,
    pub total_cost: Decimal,
    pub items_purchased: u64,
    pub purchase_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRanking {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRanking {
    pub department: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRanking {
    pub vendor_name: String,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDistribution {
    pub item_id: String,
    pub event_name: Option<String>,
    pub department: Option<String>,
    pub quantity: u32,
    pub distributed_on: NaiveDate,
}

/// Top-N rankings shown on the dashboard overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRankings {
    pub items_by_quantity: Vec<ItemRanking>,
    pub departments_by_quantity: Vec<DepartmentRanking>,
    pub vendors_by_cost: Vec<VendorRanking>,
    pub recent_distributions: Vec<RecentDistribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    HighBudgetUtilization {
        utilization_percent: Decimal,
        threshold: Decimal,
    },
    LowStock {
        items_in_stock: u64,
        threshold: u64,
    },
}

/// Headline figures for the whole ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerOverview {
    pub revision: u64,
    pub total_purchases: Decimal,
    pub total_distributions: Decimal,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub budget_remaining: Decimal,
    pub budget_utilization_percent: Option<Decimal>,
    pub items_purchased: u64,
    pub items_distributed: u64,
    pub items_in_stock: u64,
    pub active_departments: u64,
    pub warnings: Vec<ReportWarning>,
}

/// Accumulators keyed by string, kept in first-appearance order
struct Groups<T> {
    index: HashMap<String, usize>,
    entries: Vec<T>,
}

impl<T> Groups<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str, make: impl FnOnce(&str) -> T) -> &mut T {
        let existing = self.index.get(key).copied();
        let idx = match existing {
            Some(idx) => idx,
            None => {
                self.entries.push(make(key));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    fn into_vec(self) -> Vec<T> {
        self.entries
    }
}

/// Stable descending sort, truncated to `n`
fn top_n<T, K: Ord>(mut items: Vec<T>, n: usize, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items.truncate(n);
    items
}

/// Money totals clamp at the decimal range instead of overflowing
fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn department_of(record: &OutflowRecord) -> &str {
    record
        .department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(UNASSIGNED_DEPARTMENT)
}

/// Item type of a distribution, falling back to the purchased item
fn item_type_of<'a>(snapshot: &'a LedgerSnapshot, record: &'a OutflowRecord) -> Option<&'a str> {
    record
        .item_type
        .as_deref()
        .or_else(|| snapshot.find_item(&record.item_id).map(|i| i.item_type.as_str()))
}

/// Spend per event type, derived from the outflow table
pub fn spent_by_event_type(outflow: &[OutflowRecord]) -> HashMap<String, Decimal> {
    let mut spent: HashMap<String, Decimal> = HashMap::new();
    for record in outflow {
        let spent = spent.entry(record.event_type.clone()).or_default();
        *spent = spent.saturating_add(record.value());
    }
    spent
}

pub fn summarize_item_types(snapshot: &LedgerSnapshot) -> Vec<ItemTypeSummary> {
    let mut groups = Groups::new();
    let make = |item_type: &str| ItemTypeSummary {
        item_type: item_type.to_string(),
        purchase_count: 0,
        purchased_quantity: 0,
        quantity_left: 0,
        total_purchases: Decimal::ZERO,
        distribution_count: 0,
        distributed_quantity: 0,
        total_distributions: Decimal::ZERO,
    };

    for item in &snapshot.inflow {
        let summary = groups.entry(&item.item_type, make);
        summary.purchase_count += 1;
        summary.purchased_quantity += u64::from(item.quantity);
        summary.quantity_left += u64::from(item.quantity_left);
        summary.total_purchases = summary.total_purchases.saturating_add(item.total_cost);
    }

    for record in &snapshot.outflow {
        let Some(item_type) = item_type_of(snapshot, record) else {
            continue;
        };
        let summary = groups.entry(item_type, make);
        summary.distribution_count += 1;
        summary.distributed_quantity += u64::from(record.quantity);
        summary.total_distributions = summary.total_distributions.saturating_add(record.value());
    }

    groups.into_vec()
}

pub fn summarize_event_types(snapshot: &LedgerSnapshot) -> Vec<EventTypeSummary> {
    let mut groups = Groups::new();
    let make = |event_type: &str| EventTypeSummary {
        event_type: event_type.to_string(),
        budget_amount: Decimal::ZERO,
        actual_spent: Decimal::ZERO,
        remaining: Decimal::ZERO,
        utilization_percent: None,
        distribution_count: 0,
        distributed_quantity: 0,
    };

    for record in &snapshot.outflow {
        let summary = groups.entry(&record.event_type, make);
        summary.distribution_count += 1;
        summary.distributed_quantity += u64::from(record.quantity);
        summary.actual_spent = summary.actual_spent.saturating_add(record.value());
    }

    for line in &snapshot.budget {
        let summary = groups.entry(&line.event_type, make);
        summary.budget_amount = summary.budget_amount.saturating_add(line.budget_amount);
    }

    let mut summaries = groups.into_vec();
    for summary in &mut summaries {
        summary.remaining = summary.budget_amount.saturating_sub(summary.actual_spent);
        summary.utilization_percent = utilization_percent(summary.actual_spent, summary.budget_amount);
    }
    summaries
}

pub fn summarize_departments(snapshot: &LedgerSnapshot) -> Vec<DepartmentSummary> {
    let mut groups = Groups::new();
    for record in &snapshot.outflow {
        let summary = groups.entry(department_of(record), |department| DepartmentSummary {
            department: department.to_string(),
            distribution_count: 0,
            total_items: 0,
            total_value: Decimal::ZERO,
        });
        summary.distribution_count += 1;
        summary.total_items += u64::from(record.quantity);
        summary.total_value = summary.total_value.saturating_add(record.value());
    }
    groups.into_vec()
}

/// Purchases per calendar month, oldest first. Undated purchases are skipped.
pub fn summarize_monthly_purchases(snapshot: &LedgerSnapshot) -> Vec<MonthlyPurchaseSummary> {
    let mut groups = Groups::new();
    for item in &snapshot.inflow {
        let Some(date) = item.purchase_date else {
            continue;
        };
        let month = format!("{:04}-{:02}", date.year(), date.month());
        let summary = groups.entry(&month, |month| MonthlyPurchaseSummary {
            month: month.to_string(),
            total_cost: Decimal::ZERO,
            items_purchased: 0,
            purchase_count: 0,
        });
        summary.total_cost = summary.total_cost.saturating_add(item.total_cost);
        summary.items_purchased += u64::from(item.quantity);
        summary.purchase_count += 1;
    }

    let mut months = groups.into_vec();
    months.sort_by(|a, b| a.month.cmp(&b.month));
    months
}

pub fn top_rankings(snapshot: &LedgerSnapshot, n: usize) -> TopRankings {
    let items: Vec<ItemRanking> = snapshot
        .inflow
        .iter()
        .map(|item| ItemRanking {
            item_id: item.item_id.clone(),
            item_name: item.item_name.clone(),
            quantity: item.quantity,
            total_cost: item.total_cost,
        })
        .collect();

    let departments: Vec<DepartmentRanking> = summarize_departments(snapshot)
        .into_iter()
        .map(|d| DepartmentRanking {
            department: d.department,
            quantity: d.total_items,
        })
        .collect();

    let mut vendors = Groups::new();
    for item in &snapshot.inflow {
        let Some(vendor) = item.vendor_name.as_deref().filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let ranking = vendors.entry(vendor, |vendor_name| VendorRanking {
            vendor_name: vendor_name.to_string(),
            total_cost: Decimal::ZERO,
        });
        ranking.total_cost = ranking.total_cost.saturating_add(item.total_cost);
    }

    let recent: Vec<RecentDistribution> = snapshot
        .outflow
        .iter()
        .filter_map(|record| {
            record.distributed_on.map(|distributed_on| RecentDistribution {
                item_id: record.item_id.clone(),
                event_name: record.event_name.clone(),
                department: record.department.clone(),
                quantity: record.quantity,
                distributed_on,
            })
        })
        .collect();

    TopRankings {
        items_by_quantity: top_n(items, n, |i: &ItemRanking| i.quantity),
        departments_by_quantity: top_n(departments, n, |d: &DepartmentRanking| d.quantity),
        vendors_by_cost: top_n(vendors.into_vec(), n, |v: &VendorRanking| v.total_cost),
        recent_distributions: top_n(recent, n, |r: &RecentDistribution| r.distributed_on),
    }
}

pub fn build_overview(snapshot: &LedgerSnapshot, thresholds: &ReportThresholds) -> LedgerOverview {
    let total_purchases = saturating_sum(snapshot.inflow.iter().map(|i| i.total_cost));
    let total_distributions = saturating_sum(snapshot.outflow.iter().map(OutflowRecord::value));
    let total_budget = saturating_sum(snapshot.budget.iter().map(|b| b.budget_amount));
    let total_spent = saturating_sum(snapshot.budget.iter().map(|b| b.actual_amount_spent));
    let budget_utilization_percent = utilization_percent(total_spent, total_budget);

    let items_purchased: u64 = snapshot.inflow.iter().map(|i| u64::from(i.quantity)).sum();
    let items_distributed: u64 = snapshot.outflow.iter().map(|o| u64::from(o.quantity)).sum();
    let items_in_stock: u64 = snapshot.inflow.iter().map(|i| u64::from(i.quantity_left)).sum();
    let active_departments = summarize_departments(snapshot).len() as u64;

    let mut warnings = Vec::new();
    if let Some(pct) = budget_utilization_percent {
        if pct > thresholds.utilization_warning_percent {
            warnings.push(ReportWarning::HighBudgetUtilization {
                utilization_percent: pct,
                threshold: thresholds.utilization_warning_percent,
            });
        }
    }
    if items_in_stock < thresholds.low_stock_threshold {
        warnings.push(ReportWarning::LowStock {
            items_in_stock,
            threshold: thresholds.low_stock_threshold,
        });
    }

    LedgerOverview {
        revision: snapshot.revision,
        total_purchases,
        total_distributions,
        total_budget,
        total_spent,
        budget_remaining: total_budget.saturating_sub(total_spent),
        budget_utilization_percent,
        items_purchased,
        items_distributed,
        items_in_stock,
        active_departments,
        warnings,
    }
}
