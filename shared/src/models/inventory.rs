//! Inventory ledger models
//!
//! An `Item` carries a running stock balance. `Purchase` (stock-in) and
//! `Usage` (stock-out) are immutable ledger events referencing exactly one
//! item; an item's balance must always equal
//! `opening_stock + sum(purchases) - sum(usage)`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// An ingredient tracked by the inventory ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    /// Unique, case-insensitively
    pub name: String,
    pub stock: Decimal,
    pub unit: Unit,
    /// Stock at or below this threshold classifies the item as low-stock
    pub minimum_stock: Decimal,
    /// Always reflects the most recent purchase price, not an average
    pub cost_per_unit: Decimal,
    /// Baseline for ledger reconciliation; set at creation, shifted only by
    /// the manual-override edit path
    pub opening_stock: Decimal,
    pub supplier_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Item {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.minimum_stock
    }

    pub fn stock_value(&self) -> Decimal {
        self.stock * self.cost_per_unit
    }
}

/// Unit of measure vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    L,
    Ml,
    Pcs,
    Pack,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
            Unit::Pcs => "pcs",
            Unit::Pack => "pack",
        }
    }
}

impl FromStr for Unit {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Unit::Kg),
            "g" => Ok(Unit::G),
            "l" => Ok(Unit::L),
            "ml" => Ok(Unit::Ml),
            "pcs" => Ok(Unit::Pcs),
            "pack" => Ok(Unit::Pack),
            _ => Err("Unknown unit"),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stock-in event. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    /// Price paid per unit at the time of purchase
    pub cost_per_unit: Decimal,
    /// quantity * cost_per_unit, stored at creation
    pub total_cost: Decimal,
    pub supplier: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stock-out event. Immutable once created.
///
/// Presence of `order_id` is the sole signal distinguishing cost of goods
/// sold from wastage everywhere in reporting; `usage_type` is carried but
/// never interpreted by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity_used: Decimal,
    pub usage_type: UsageType,
    pub order_id: Option<String>,
    /// quantity_used * item cost_per_unit captured at usage time; never
    /// recalculated when the item's cost later changes
    pub cost_incurred: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Usage {
    /// Sales-linked usage counts toward COGS; everything else is wastage
    pub fn is_cogs(&self) -> bool {
        self.order_id.is_some()
    }
}

/// Why stock left the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    Sales,
    Wastage,
    Staff,
    Other,
}

impl UsageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageType::Sales => "sales",
            UsageType::Wastage => "wastage",
            UsageType::Staff => "staff",
            UsageType::Other => "other",
        }
    }
}

impl FromStr for UsageType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales" => Ok(UsageType::Sales),
            "wastage" => Ok(UsageType::Wastage),
            "staff" => Ok(UsageType::Staff),
            "other" => Ok(UsageType::Other),
            _ => Err("Unknown usage type"),
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of comparing an item's recorded stock against its ledger history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub item_id: Uuid,
    pub name: String,
    pub recorded_stock: Decimal,
    /// opening_stock + sum(purchase quantities) - sum(usage quantities)
    pub expected_stock: Decimal,
    pub drift: Decimal,
    pub in_sync: bool,
    /// Set when a coupled write failed part-way and compensation also failed
    pub flagged: bool,
}
