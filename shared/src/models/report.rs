//! Reporting and dashboard shapes
//!
//! JSON keys are camelCase to stay wire-compatible with the dashboard and
//! report objects the POS clients already consume.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dashboard metrics computed over the current ledger contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Sum over items of stock * cost_per_unit
    pub total_stock_value: Decimal,
    pub today_usage_cost: Decimal,
    /// Usage cost over the trailing 7 days
    pub week_usage_cost: Decimal,
    /// Items with stock at or below their minimum threshold
    pub low_stock_count: i64,
    /// Today's usage cost with no order reference
    pub wastage_cost: Decimal,
    /// Today's usage cost tied to an order
    pub cogs_today: Decimal,
    /// Up to 5 ingredients by today's consumed quantity, descending;
    /// ties break by ascending name
    pub top_ingredients: Vec<TopIngredient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopIngredient {
    pub name: String,
    pub quantity: Decimal,
}

/// Date-ranged report over purchases and usage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub summary: ReportSummary,
    /// Per-item breakdown keyed by item name; the map keeps keys ordered so
    /// reports and CSV rows come out in a stable name order
    pub item_usage: BTreeMap<String, ItemUsageTotals>,
    pub wastage_breakdown: Vec<WastageEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_stock_in_qty: Decimal,
    pub total_stock_in_value: Decimal,
    pub total_stock_out_qty: Decimal,
    pub total_stock_out_value: Decimal,
    pub wastage_qty: Decimal,
    pub wastage_value: Decimal,
    pub cogs: Decimal,
}

/// Per-item totals in the report table; also the CSV export row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUsageTotals {
    pub stock_in: Decimal,
    pub stock_out: Decimal,
    pub wastage: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WastageEntry {
    pub item_name: String,
    pub quantity: Decimal,
    pub cost: Decimal,
    pub date: DateTime<Utc>,
}

/// Inclusive date range resolved from a report period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let date = ts.date_naive();
        date >= self.start && date <= self.end
    }
}
