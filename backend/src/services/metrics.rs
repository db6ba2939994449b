//! Metrics and reporting engine
//!
//! Read-only: derives dashboard snapshots and period reports from the
//! current items and the immutable ledger history. All aggregation is in
//! pure functions over already-fetched rows so the math is testable without
//! a store.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use shared::models::{
    DashboardSnapshot, DateRange, Item, ItemUsageTotals, PeriodReport, Purchase, ReportSummary,
    TopIngredient, Usage, WastageEntry,
};

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

pub struct MetricsService {
    store: Arc<dyn InventoryStore>,
}

impl MetricsService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardSnapshot> {
        let today = Utc::now().date_naive();
        let week = DateRange::new(today - Duration::days(7), today);

        let items = self.store.list_items().await?;
        let week_usage = self.store.list_usage(Some(week)).await?;

        Ok(compute_dashboard(&items, &week_usage, today))
    }

    pub async fn report(
        &self,
        period: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> AppResult<PeriodReport> {
        let today = Utc::now().date_naive();
        let (label, range) = resolve_period(period, start, end, today)?;

        let items = self.store.list_items().await?;
        let purchases = self.store.list_purchases(Some(range)).await?;
        let usage = self.store.list_usage(Some(range)).await?;

        Ok(compute_report(&label, range, &items, &purchases, &usage))
    }
}

/// Map a period name (and optional custom bounds) to an inclusive date
/// range. An absent period means the trailing week; an unrecognized one is
/// rejected rather than silently widened.
pub fn resolve_period(
    period: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> AppResult<(String, DateRange)> {
    let period = period.unwrap_or("last7");
    let range = match period {
        "today" => DateRange::new(today, today),
        "yesterday" => {
            let y = today - Duration::days(1);
            DateRange::new(y, y)
        }
        "last7" => DateRange::new(today - Duration::days(7), today),
        "last30" => DateRange::new(today - Duration::days(30), today),
        "custom" => {
            let start = start
                .ok_or_else(|| AppError::validation("start_date", "Missing required field"))?;
            let end =
                end.ok_or_else(|| AppError::validation("end_date", "Missing required field"))?;
            let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
                .map_err(|_| AppError::validation("start_date", "Expected YYYY-MM-DD"))?;
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
                .map_err(|_| AppError::validation("end_date", "Expected YYYY-MM-DD"))?;
            if start > end {
                return Err(AppError::validation(
                    "start_date",
                    "Start date is after end date",
                ));
            }
            DateRange::new(start, end)
        }
        _ => return Err(AppError::validation("period", "Unrecognized period")),
    };
    Ok((period.to_string(), range))
}

/// Dashboard numbers from the current items and the trailing week's usage.
/// `week_usage` must already be restricted to the 7-day window ending today.
pub fn compute_dashboard(items: &[Item], week_usage: &[Usage], today: NaiveDate) -> DashboardSnapshot {
    let total_stock_value = items.iter().map(Item::stock_value).sum();
    let low_stock_count = items.iter().filter(|i| i.is_low_stock()).count() as i64;

    let mut today_usage_cost = Decimal::ZERO;
    let mut week_usage_cost = Decimal::ZERO;
    let mut wastage_cost = Decimal::ZERO;
    let mut cogs_today = Decimal::ZERO;
    let mut today_qty: BTreeMap<&str, Decimal> = BTreeMap::new();

    let names: BTreeMap<_, _> = items.iter().map(|i| (i.id, i.name.as_str())).collect();

    for u in week_usage {
        week_usage_cost += u.cost_incurred;
        if u.created_at.date_naive() == today {
            today_usage_cost += u.cost_incurred;
            if u.is_cogs() {
                cogs_today += u.cost_incurred;
            } else {
                wastage_cost += u.cost_incurred;
            }
            if let Some(name) = names.get(&u.ingredient_id) {
                *today_qty.entry(*name).or_insert(Decimal::ZERO) += u.quantity_used;
            }
        }
    }

    // Top 5 by consumed quantity; the BTreeMap already orders names, so a
    // stable sort on quantity keeps name order for ties
    let mut top: Vec<TopIngredient> = today_qty
        .into_iter()
        .map(|(name, quantity)| TopIngredient {
            name: name.to_string(),
            quantity,
        })
        .collect();
    top.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    top.truncate(5);

    DashboardSnapshot {
        total_stock_value,
        today_usage_cost,
        week_usage_cost,
        low_stock_count,
        wastage_cost,
        cogs_today,
        top_ingredients: top,
    }
}

/// Aggregate one period's purchases and usage into the report shape.
///
/// The per-item table is keyed by item name and includes purchase-only
/// items. Usage referencing a deleted item has no name to report under, so
/// it is dropped from the table but still counted in the summary, and shows
/// up as "Unknown" in the wastage breakdown.
pub fn compute_report(
    period: &str,
    range: DateRange,
    items: &[Item],
    purchases: &[Purchase],
    usage: &[Usage],
) -> PeriodReport {
    let names: BTreeMap<_, _> = items.iter().map(|i| (i.id, i.name.as_str())).collect();

    let mut per_item: BTreeMap<String, ItemUsageTotals> = BTreeMap::new();
    let mut summary = ReportSummary {
        total_stock_in_qty: Decimal::ZERO,
        total_stock_in_value: Decimal::ZERO,
        total_stock_out_qty: Decimal::ZERO,
        total_stock_out_value: Decimal::ZERO,
        wastage_qty: Decimal::ZERO,
        wastage_value: Decimal::ZERO,
        cogs: Decimal::ZERO,
    };
    let mut wastage_breakdown = Vec::new();

    for p in purchases {
        summary.total_stock_in_qty += p.quantity;
        summary.total_stock_in_value += p.total_cost;
        if let Some(name) = names.get(&p.ingredient_id) {
            let row = per_item.entry(name.to_string()).or_default();
            row.stock_in += p.quantity;
        }
    }

    for u in usage {
        summary.total_stock_out_qty += u.quantity_used;
        summary.total_stock_out_value += u.cost_incurred;
        if u.is_cogs() {
            summary.cogs += u.cost_incurred;
        } else {
            summary.wastage_qty += u.quantity_used;
            summary.wastage_value += u.cost_incurred;
            wastage_breakdown.push(WastageEntry {
                item_name: names
                    .get(&u.ingredient_id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                quantity: u.quantity_used,
                cost: u.cost_incurred,
                date: u.created_at,
            });
        }
        if let Some(name) = names.get(&u.ingredient_id) {
            let row = per_item.entry(name.to_string()).or_default();
            row.stock_out += u.quantity_used;
            row.cost += u.cost_incurred;
            if !u.is_cogs() {
                row.wastage += u.quantity_used;
            }
        }
    }

    wastage_breakdown.sort_by(|a, b| b.date.cmp(&a.date));

    PeriodReport {
        period: period.to_string(),
        start_date: range.start,
        end_date: range.end,
        summary,
        item_usage: per_item,
        wastage_breakdown,
    }
}
