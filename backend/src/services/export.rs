//! Presentation adapter: list filtering and CSV export
//!
//! Filtering is applied in-process over the full item list; the store only
//! ever serves unfiltered collections. CSV money and quantity cells are
//! fixed to two decimal places.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{Item, PeriodReport, Unit};

use crate::error::{AppError, AppResult};

/// Query parameters for GET /inventory
#[derive(Debug, Default, serde::Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring match on the item name
    pub search: Option<String>,
    pub unit: Option<String>,
    /// "low" or "normal", judged against each item's minimum_stock
    pub stock: Option<String>,
}

pub fn filter_items(items: Vec<Item>, filter: &ItemFilter) -> AppResult<Vec<Item>> {
    let unit = match filter.unit.as_deref() {
        Some(u) => Some(
            Unit::from_str(u)
                .map_err(|_| AppError::validation("unit", "Unrecognized unit of measure"))?,
        ),
        None => None,
    };

    let low_only = match filter.stock.as_deref() {
        None => None,
        Some("low") => Some(true),
        Some("normal") => Some(false),
        Some(_) => {
            return Err(AppError::validation(
                "stock",
                "Expected \"low\" or \"normal\"",
            ))
        }
    };

    let search = filter.search.as_deref().map(str::to_lowercase);

    Ok(items
        .into_iter()
        .filter(|item| {
            search
                .as_deref()
                .map_or(true, |s| item.name.to_lowercase().contains(s))
                && unit.map_or(true, |u| item.unit == u)
                && low_only.map_or(true, |low| item.is_low_stock() == low)
        })
        .collect())
}

/// Render the per-item table of a report as CSV
pub fn report_to_csv(report: &PeriodReport) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Item", "Stock In", "Stock Out", "Wastage", "Cost"])
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;

    for (item, row) in &report.item_usage {
        writer
            .write_record([
                item.clone(),
                two_dp(row.stock_in),
                two_dp(row.stock_out),
                two_dp(row.wastage),
                two_dp(row.cost),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding failed: {e}")))
}

pub fn export_filename(period: &str, date: NaiveDate) -> String {
    format!("inventory_report_{}_{}.csv", period, date.format("%Y-%m-%d"))
}

fn two_dp(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
