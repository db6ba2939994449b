//! Repository gateway over the persistent store
//!
//! The ledger and metrics engines only ever talk to the store through this
//! trait. Adapters carry no business logic: they fetch, insert, update and
//! delete rows in the three collections and nothing else. All calls are
//! network-bound from the engines' perspective; ordering is only guaranteed
//! per item id, by the ledger's per-item locks.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use shared::models::{DateRange, Item, Purchase, Usage};
use uuid::Uuid;

use crate::error::AppResult;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All items, ordered by name
    async fn list_items(&self) -> AppResult<Vec<Item>>;

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>>;

    /// Insert a fully-populated item row; returns it as stored
    async fn insert_item(&self, item: Item) -> AppResult<Item>;

    /// Overwrite the item row identified by `item.id`. The ledger engine
    /// always holds the current row under the item's lock, so a full-row
    /// write is equivalent to a partial update.
    async fn update_item(&self, item: &Item) -> AppResult<()>;

    async fn delete_item(&self, id: Uuid) -> AppResult<()>;

    /// Purchases whose creation date falls in the inclusive range, or all
    async fn list_purchases(&self, range: Option<DateRange>) -> AppResult<Vec<Purchase>>;

    async fn insert_purchase(&self, purchase: Purchase) -> AppResult<()>;

    /// Usage rows whose creation date falls in the inclusive range, or all
    async fn list_usage(&self, range: Option<DateRange>) -> AppResult<Vec<Usage>>;

    async fn insert_usage(&self, usage: Usage) -> AppResult<()>;

    /// Whether any usage row references the item (blocks delete)
    async fn item_has_usage(&self, id: Uuid) -> AppResult<bool>;

    /// Full purchase history for one item, for reconciliation
    async fn purchases_for_item(&self, id: Uuid) -> AppResult<Vec<Purchase>>;

    /// Full usage history for one item, for reconciliation
    async fn usage_for_item(&self, id: Uuid) -> AppResult<Vec<Usage>>;

    /// Connectivity probe for the health endpoint
    async fn ping(&self) -> AppResult<()>;
}
