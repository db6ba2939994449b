//! Inventory ledger engine
//!
//! Sole writer of `Item.stock` and `Item.cost_per_unit`. Every stock
//! mutation is paired with exactly one immutable ledger row (a `Purchase` or
//! a `Usage`), and the pair is applied as one atomic unit: mutations for a
//! given item are serialized through a per-item lock, the sufficiency check
//! re-reads the item inside that lock, and a ledger insert that fails after
//! the item write triggers a compensating restore of the previous row. If
//! the compensation itself fails the item is flagged and the caller is told
//! to reconcile.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::models::{Item, Purchase, ReconciliationReport, Unit, Usage, UsageType};
use shared::validation::{
    normalize_optional, validate_item_name, validate_non_negative, validate_positive,
    validate_supplier,
};

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Request body for POST /inventory/add-item
#[derive(Debug, Deserialize)]
pub struct AddItemInput {
    pub name: String,
    pub stock: Option<Decimal>,
    pub unit: String,
    pub minimum_stock: Option<Decimal>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier_info: Option<String>,
}

/// Request body for POST /inventory/add-stock
#[derive(Debug, Deserialize)]
pub struct AddStockInput {
    pub ingredient_id: Uuid,
    pub quantity: Option<Decimal>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// Request body for POST /inventory/use-stock
#[derive(Debug, Deserialize)]
pub struct UseStockInput {
    pub ingredient_id: Uuid,
    pub quantity_used: Option<Decimal>,
    pub usage_type: Option<String>,
    pub order_id: Option<String>,
    pub notes: Option<String>,
}

/// Request body for PUT /inventory/:item_id, a full replacement
#[derive(Debug, Deserialize)]
pub struct EditItemInput {
    pub name: String,
    pub stock: Option<Decimal>,
    pub unit: String,
    pub minimum_stock: Option<Decimal>,
    pub cost_per_unit: Option<Decimal>,
    pub supplier_info: Option<String>,
}

pub struct LedgerService {
    store: Arc<dyn InventoryStore>,
    /// One lock per item id; mutations on the same item are linearized,
    /// different items proceed in parallel
    locks: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    /// Items whose coupled write failed part-way with a failed compensation
    flagged: StdMutex<HashSet<Uuid>>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            store,
            locks: StdMutex::new(HashMap::new()),
            flagged: StdMutex::new(HashSet::new()),
        }
    }

    fn item_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock table poisoned");
        locks.entry(id).or_default().clone()
    }

    fn flag_for_reconciliation(&self, id: Uuid) {
        self.flagged
            .lock()
            .expect("flag table poisoned")
            .insert(id);
    }

    fn is_flagged(&self, id: Uuid) -> bool {
        self.flagged
            .lock()
            .expect("flag table poisoned")
            .contains(&id)
    }

    fn clear_flag(&self, id: Uuid) {
        self.flagged
            .lock()
            .expect("flag table poisoned")
            .remove(&id);
    }

    /// Create a new ingredient. Name collisions are checked
    /// case-insensitively against the whole collection.
    pub async fn add_item(&self, input: AddItemInput) -> AppResult<Item> {
        let name = input.name.trim().to_string();
        validate_item_name(&name).map_err(|m| AppError::validation("name", m))?;

        let unit = Unit::from_str(&input.unit)
            .map_err(|_| AppError::validation("unit", "Unrecognized unit of measure"))?;

        let minimum_stock = input
            .minimum_stock
            .ok_or_else(|| AppError::validation("minimum_stock", "Missing required field"))?;
        validate_non_negative(minimum_stock)
            .map_err(|m| AppError::validation("minimum_stock", m))?;

        let cost_per_unit = input
            .cost_per_unit
            .ok_or_else(|| AppError::validation("cost_per_unit", "Missing required field"))?;
        validate_non_negative(cost_per_unit)
            .map_err(|m| AppError::validation("cost_per_unit", m))?;

        let stock = input.stock.unwrap_or(Decimal::ZERO);
        validate_non_negative(stock).map_err(|m| AppError::validation("stock", m))?;

        // Full Unicode case folding, matching the store's LOWER(name) index
        let folded = name.to_lowercase();
        let existing = self.store.list_items().await?;
        if existing.iter().any(|i| i.name.to_lowercase() == folded) {
            return Err(AppError::DuplicateName(name));
        }

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            name,
            stock,
            unit,
            minimum_stock,
            cost_per_unit,
            opening_stock: stock,
            supplier_info: normalize_optional(input.supplier_info),
            created_at: now,
            last_updated: now,
        };

        self.store.insert_item(item).await
    }

    /// Record a purchase: stock goes up, the item's cost_per_unit is
    /// overwritten with the new purchase price (latest-price policy), and a
    /// Purchase row is appended, all under the item's lock.
    pub async fn add_stock(&self, input: AddStockInput) -> AppResult<Purchase> {
        let quantity = input
            .quantity
            .ok_or_else(|| AppError::validation("quantity", "Missing required field"))?;
        validate_positive(quantity).map_err(|m| AppError::validation("quantity", m))?;

        let cost_per_unit = input
            .cost_per_unit
            .ok_or_else(|| AppError::validation("cost_per_unit", "Missing required field"))?;
        validate_positive(cost_per_unit).map_err(|m| AppError::validation("cost_per_unit", m))?;

        let supplier = input
            .supplier
            .ok_or_else(|| AppError::validation("supplier", "Missing required field"))?;
        validate_supplier(&supplier).map_err(|m| AppError::validation("supplier", m))?;
        let supplier = supplier.trim().to_string();

        let lock = self.item_lock(input.ingredient_id);
        let _guard = lock.lock().await;

        let previous = self
            .store
            .get_item(input.ingredient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        let now = Utc::now();
        let mut updated = previous.clone();
        updated.stock = previous.stock + quantity;
        updated.cost_per_unit = cost_per_unit;
        updated.last_updated = now;

        self.store.update_item(&updated).await?;

        let purchase = Purchase {
            id: Uuid::new_v4(),
            ingredient_id: previous.id,
            quantity,
            cost_per_unit,
            total_cost: quantity * cost_per_unit,
            supplier,
            notes: normalize_optional(input.notes),
            created_at: now,
        };

        if let Err(insert_err) = self.store.insert_purchase(purchase.clone()).await {
            return Err(self.compensate(&previous, insert_err).await);
        }

        Ok(purchase)
    }

    /// Record a stock-out: the sufficiency check runs against the freshest
    /// stock, re-read inside the item's lock, so concurrent use-stock calls
    /// can never drive the balance negative.
    pub async fn use_stock(&self, input: UseStockInput) -> AppResult<Usage> {
        let quantity_used = input
            .quantity_used
            .ok_or_else(|| AppError::validation("quantity_used", "Missing required field"))?;
        validate_positive(quantity_used).map_err(|m| AppError::validation("quantity_used", m))?;

        let usage_type = input
            .usage_type
            .as_deref()
            .ok_or_else(|| AppError::validation("usage_type", "Missing required field"))?;
        let usage_type = UsageType::from_str(usage_type)
            .map_err(|_| AppError::validation("usage_type", "Unrecognized usage type"))?;

        let lock = self.item_lock(input.ingredient_id);
        let _guard = lock.lock().await;

        let previous = self
            .store
            .get_item(input.ingredient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        if quantity_used > previous.stock {
            return Err(AppError::InsufficientStock {
                requested: quantity_used,
                available: previous.stock,
            });
        }

        let now = Utc::now();
        let mut updated = previous.clone();
        updated.stock = previous.stock - quantity_used;
        updated.last_updated = now;

        self.store.update_item(&updated).await?;

        let usage = Usage {
            id: Uuid::new_v4(),
            ingredient_id: previous.id,
            quantity_used,
            usage_type,
            order_id: normalize_optional(input.order_id),
            // Captured at this instant; later cost changes never touch it
            cost_incurred: quantity_used * previous.cost_per_unit,
            notes: normalize_optional(input.notes),
            created_at: now,
        };

        if let Err(insert_err) = self.store.insert_usage(usage.clone()).await {
            return Err(self.compensate(&previous, insert_err).await);
        }

        Ok(usage)
    }

    /// Restore the item row after a failed ledger insert. A successful
    /// restore leaves the store consistent and the original store error
    /// propagates; a failed restore flags the item for reconciliation.
    async fn compensate(&self, previous: &Item, insert_err: AppError) -> AppError {
        tracing::warn!(
            item_id = %previous.id,
            "Ledger insert failed after item update, restoring previous row"
        );
        match self.store.update_item(previous).await {
            Ok(()) => insert_err,
            Err(restore_err) => {
                tracing::error!(
                    item_id = %previous.id,
                    error = %restore_err,
                    "Compensation failed, item flagged for reconciliation"
                );
                self.flag_for_reconciliation(previous.id);
                AppError::PartialWrite {
                    item_id: previous.id,
                    detail: insert_err.to_string(),
                }
            }
        }
    }

    /// Manual-override edit: direct overwrite, no ledger row. The
    /// reconciliation baseline follows the stock correction so drift
    /// detection keeps working for genuine dual-write crashes.
    pub async fn edit_item(&self, item_id: Uuid, input: EditItemInput) -> AppResult<Item> {
        let name = input.name.trim().to_string();
        validate_item_name(&name).map_err(|m| AppError::validation("name", m))?;

        let unit = Unit::from_str(&input.unit)
            .map_err(|_| AppError::validation("unit", "Unrecognized unit of measure"))?;

        let stock = input
            .stock
            .ok_or_else(|| AppError::validation("stock", "Missing required field"))?;
        validate_non_negative(stock).map_err(|m| AppError::validation("stock", m))?;

        let minimum_stock = input
            .minimum_stock
            .ok_or_else(|| AppError::validation("minimum_stock", "Missing required field"))?;
        validate_non_negative(minimum_stock)
            .map_err(|m| AppError::validation("minimum_stock", m))?;

        let cost_per_unit = input
            .cost_per_unit
            .ok_or_else(|| AppError::validation("cost_per_unit", "Missing required field"))?;
        validate_non_negative(cost_per_unit)
            .map_err(|m| AppError::validation("cost_per_unit", m))?;

        let lock = self.item_lock(item_id);
        let _guard = lock.lock().await;

        let previous = self
            .store
            .get_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let stock_delta = stock - previous.stock;
        if stock_delta != Decimal::ZERO {
            tracing::warn!(
                item_id = %item_id,
                delta = %stock_delta,
                "Manual override changed stock without a ledger row; baseline shifted"
            );
        }

        let mut updated = previous.clone();
        updated.name = name;
        updated.stock = stock;
        updated.unit = unit;
        updated.minimum_stock = minimum_stock;
        updated.cost_per_unit = cost_per_unit;
        updated.opening_stock = previous.opening_stock + stock_delta;
        updated.supplier_info = normalize_optional(input.supplier_info);
        updated.last_updated = Utc::now();

        self.store.update_item(&updated).await?;
        Ok(updated)
    }

    /// Delete an item. Usage rows are protected history and block the
    /// delete; purchases intentionally do not.
    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<()> {
        let lock = self.item_lock(item_id);
        let _guard = lock.lock().await;

        let item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        if self.store.item_has_usage(item_id).await? {
            return Err(AppError::HasHistory(item.name));
        }

        self.store.delete_item(item_id).await?;

        // The id can never come back, so its lock and flag entries are dead
        self.clear_flag(item_id);
        drop(_guard);
        self.locks
            .lock()
            .expect("lock table poisoned")
            .remove(&item_id);
        Ok(())
    }

    /// Maintenance check: recorded stock vs. the sum of the item's ledger
    /// history. Detects the gap a crash between the two coupled writes
    /// leaves behind.
    pub async fn reconcile(&self, item_id: Uuid) -> AppResult<ReconciliationReport> {
        let lock = self.item_lock(item_id);
        let _guard = lock.lock().await;

        let item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let purchased: Decimal = self
            .store
            .purchases_for_item(item_id)
            .await?
            .iter()
            .map(|p| p.quantity)
            .sum();
        let used: Decimal = self
            .store
            .usage_for_item(item_id)
            .await?
            .iter()
            .map(|u| u.quantity_used)
            .sum();

        let expected = item.opening_stock + purchased - used;
        let drift = item.stock - expected;
        let in_sync = drift == Decimal::ZERO;

        if in_sync {
            self.clear_flag(item_id);
        } else {
            self.flag_for_reconciliation(item_id);
        }

        Ok(ReconciliationReport {
            item_id,
            name: item.name,
            recorded_stock: item.stock,
            expected_stock: expected,
            drift,
            in_sync,
            flagged: self.is_flagged(item_id),
        })
    }

    /// All items, ordered by name
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.store.list_items().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn input(name: &str) -> AddItemInput {
        AddItemInput {
            name: name.to_string(),
            stock: Some(Decimal::from(5)),
            unit: "kg".to_string(),
            minimum_stock: Some(Decimal::ZERO),
            cost_per_unit: Some(Decimal::ONE),
            supplier_info: None,
        }
    }

    #[tokio::test]
    async fn test_delete_prunes_lock_and_flag_entries() {
        let ledger = LedgerService::new(Arc::new(MemoryStore::new()));
        let item = ledger.add_item(input("Saffron")).await.unwrap();

        ledger.reconcile(item.id).await.unwrap();
        ledger.flag_for_reconciliation(item.id);
        assert!(!ledger.locks.lock().unwrap().is_empty());

        ledger.delete_item(item.id).await.unwrap();

        assert!(ledger.locks.lock().unwrap().is_empty());
        assert!(ledger.flagged.lock().unwrap().is_empty());
    }
}
