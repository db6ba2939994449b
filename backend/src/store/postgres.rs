//! PostgreSQL adapter for the repository gateway
//!
//! Runtime `query_as` with local row structs mapped into the shared models.
//! Every call runs under the configured bounded timeout; a timed-out call is
//! reported as `StoreUnavailable` and never retried here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use shared::models::{DateRange, Item, Purchase, Unit, Usage, UsageType};

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    timeout: Duration,
}

/// Row for the inventory table
#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    stock: Decimal,
    unit: String,
    minimum_stock: Decimal,
    cost_per_unit: Decimal,
    opening_stock: Decimal,
    supplier_info: Option<String>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl ItemRow {
    fn into_item(self) -> AppResult<Item> {
        let unit = Unit::from_str(&self.unit)
            .map_err(|_| AppError::Internal(format!("Unknown unit in store: {}", self.unit)))?;
        Ok(Item {
            id: self.id,
            name: self.name,
            stock: self.stock,
            unit,
            minimum_stock: self.minimum_stock,
            cost_per_unit: self.cost_per_unit,
            opening_stock: self.opening_stock,
            supplier_info: self.supplier_info,
            created_at: self.created_at,
            last_updated: self.last_updated,
        })
    }
}

/// Row for the inventory_purchases table
#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: Uuid,
    ingredient_id: Uuid,
    quantity: Decimal,
    cost_per_unit: Decimal,
    total_cost: Decimal,
    supplier: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Purchase {
            id: row.id,
            ingredient_id: row.ingredient_id,
            quantity: row.quantity,
            cost_per_unit: row.cost_per_unit,
            total_cost: row.total_cost,
            supplier: row.supplier,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// Row for the inventory_usage table
#[derive(Debug, FromRow)]
struct UsageRow {
    id: Uuid,
    ingredient_id: Uuid,
    quantity_used: Decimal,
    usage_type: String,
    order_id: Option<String>,
    cost_incurred: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl UsageRow {
    fn into_usage(self) -> AppResult<Usage> {
        let usage_type = UsageType::from_str(&self.usage_type).map_err(|_| {
            AppError::Internal(format!("Unknown usage type in store: {}", self.usage_type))
        })?;
        Ok(Usage {
            id: self.id,
            ingredient_id: self.ingredient_id,
            quantity_used: self.quantity_used,
            usage_type,
            order_id: self.order_id,
            cost_incurred: self.cost_incurred,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

impl PostgresStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Run a store call under the bounded timeout
    async fn bounded<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AppError::StoreUnavailable(e.to_string())),
            Err(_) => Err(AppError::StoreUnavailable(
                "Store operation timed out".to_string(),
            )),
        }
    }
}

/// Postgres unique_violation, raised by the LOWER(name) index when two
/// add-item calls race past the engine's duplicate check
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl InventoryStore for PostgresStore {
    async fn list_items(&self) -> AppResult<Vec<Item>> {
        let rows = self
            .bounded(
                sqlx::query_as::<_, ItemRow>(
                    r#"
                    SELECT id, name, stock, unit, minimum_stock, cost_per_unit,
                           opening_stock, supplier_info, created_at, last_updated
                    FROM inventory
                    ORDER BY name ASC
                    "#,
                )
                .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        let row = self
            .bounded(
                sqlx::query_as::<_, ItemRow>(
                    r#"
                    SELECT id, name, stock, unit, minimum_stock, cost_per_unit,
                           opening_stock, supplier_info, created_at, last_updated
                    FROM inventory
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(ItemRow::into_item).transpose()
    }

    async fn insert_item(&self, item: Item) -> AppResult<Item> {
        let fut = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO inventory (
                id, name, stock, unit, minimum_stock, cost_per_unit,
                opening_stock, supplier_info, created_at, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, stock, unit, minimum_stock, cost_per_unit,
                      opening_stock, supplier_info, created_at, last_updated
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(item.stock)
        .bind(item.unit.as_str())
        .bind(item.minimum_stock)
        .bind(item.cost_per_unit)
        .bind(item.opening_stock)
        .bind(&item.supplier_info)
        .bind(item.created_at)
        .bind(item.last_updated)
        .fetch_one(&self.pool);

        // The LOWER(name) index backstops the engine's duplicate check; its
        // violation is the caller's name collision, not a store outage
        let row = match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(row)) => row,
            Ok(Err(e)) if is_unique_violation(&e) => {
                return Err(AppError::DuplicateName(item.name))
            }
            Ok(Err(e)) => return Err(AppError::StoreUnavailable(e.to_string())),
            Err(_) => {
                return Err(AppError::StoreUnavailable(
                    "Store operation timed out".to_string(),
                ))
            }
        };

        row.into_item()
    }

    async fn update_item(&self, item: &Item) -> AppResult<()> {
        let result = self
            .bounded(
                sqlx::query(
                    r#"
                    UPDATE inventory
                    SET name = $2, stock = $3, unit = $4, minimum_stock = $5,
                        cost_per_unit = $6, opening_stock = $7, supplier_info = $8,
                        last_updated = $9
                    WHERE id = $1
                    "#,
                )
                .bind(item.id)
                .bind(&item.name)
                .bind(item.stock)
                .bind(item.unit.as_str())
                .bind(item.minimum_stock)
                .bind(item.cost_per_unit)
                .bind(item.opening_stock)
                .bind(&item.supplier_info)
                .bind(item.last_updated)
                .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item".to_string()));
        }
        Ok(())
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<()> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM inventory WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item".to_string()));
        }
        Ok(())
    }

    async fn list_purchases(&self, range: Option<DateRange>) -> AppResult<Vec<Purchase>> {
        let (start, end) = (range.map(|r| r.start), range.map(|r| r.end));
        let rows = self
            .bounded(
                sqlx::query_as::<_, PurchaseRow>(
                    r#"
                    SELECT id, ingredient_id, quantity, cost_per_unit, total_cost,
                           supplier, notes, created_at
                    FROM inventory_purchases
                    WHERE ($1::date IS NULL OR created_at::date >= $1)
                      AND ($2::date IS NULL OR created_at::date <= $2)
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Purchase::from).collect())
    }

    async fn insert_purchase(&self, purchase: Purchase) -> AppResult<()> {
        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO inventory_purchases (
                    id, ingredient_id, quantity, cost_per_unit, total_cost,
                    supplier, notes, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(purchase.id)
            .bind(purchase.ingredient_id)
            .bind(purchase.quantity)
            .bind(purchase.cost_per_unit)
            .bind(purchase.total_cost)
            .bind(&purchase.supplier)
            .bind(&purchase.notes)
            .bind(purchase.created_at)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn list_usage(&self, range: Option<DateRange>) -> AppResult<Vec<Usage>> {
        let (start, end) = (range.map(|r| r.start), range.map(|r| r.end));
        let rows = self
            .bounded(
                sqlx::query_as::<_, UsageRow>(
                    r#"
                    SELECT id, ingredient_id, quantity_used, usage_type, order_id,
                           cost_incurred, notes, created_at
                    FROM inventory_usage
                    WHERE ($1::date IS NULL OR created_at::date >= $1)
                      AND ($2::date IS NULL OR created_at::date <= $2)
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter().map(UsageRow::into_usage).collect()
    }

    async fn insert_usage(&self, usage: Usage) -> AppResult<()> {
        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO inventory_usage (
                    id, ingredient_id, quantity_used, usage_type, order_id,
                    cost_incurred, notes, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(usage.id)
            .bind(usage.ingredient_id)
            .bind(usage.quantity_used)
            .bind(usage.usage_type.as_str())
            .bind(&usage.order_id)
            .bind(usage.cost_incurred)
            .bind(&usage.notes)
            .bind(usage.created_at)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn item_has_usage(&self, id: Uuid) -> AppResult<bool> {
        self.bounded(
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM inventory_usage WHERE ingredient_id = $1)",
            )
            .bind(id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn purchases_for_item(&self, id: Uuid) -> AppResult<Vec<Purchase>> {
        let rows = self
            .bounded(
                sqlx::query_as::<_, PurchaseRow>(
                    r#"
                    SELECT id, ingredient_id, quantity, cost_per_unit, total_cost,
                           supplier, notes, created_at
                    FROM inventory_purchases
                    WHERE ingredient_id = $1
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(id)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Purchase::from).collect())
    }

    async fn usage_for_item(&self, id: Uuid) -> AppResult<Vec<Usage>> {
        let rows = self
            .bounded(
                sqlx::query_as::<_, UsageRow>(
                    r#"
                    SELECT id, ingredient_id, quantity_used, usage_type, order_id,
                           cost_incurred, notes, created_at
                    FROM inventory_usage
                    WHERE ingredient_id = $1
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(id)
                .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter().map(UsageRow::into_usage).collect()
    }

    async fn ping(&self) -> AppResult<()> {
        self.bounded(sqlx::query("SELECT 1").execute(&self.pool))
            .await?;
        Ok(())
    }
}
