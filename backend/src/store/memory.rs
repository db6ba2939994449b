//! In-memory adapter for the repository gateway
//!
//! Backs the integration tests and local development without a database.
//! Mirrors the Postgres adapter's observable behavior: items listed by name,
//! case-folded unique item names, date ranges inclusive on the creation date.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::models::{DateRange, Item, Purchase, Usage};

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

#[derive(Default)]
struct Collections {
    items: HashMap<Uuid, Item>,
    purchases: Vec<Purchase>,
    usage: Vec<Usage>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_items(&self) -> AppResult<Vec<Item>> {
        let inner = self.inner.read().await;
        let mut items: Vec<Item> = inner.items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        let inner = self.inner.read().await;
        Ok(inner.items.get(&id).cloned())
    }

    async fn insert_item(&self, item: Item) -> AppResult<Item> {
        let mut inner = self.inner.write().await;
        // Same constraint as the Postgres LOWER(name) unique index
        let folded = item.name.to_lowercase();
        if inner.items.values().any(|i| i.name.to_lowercase() == folded) {
            return Err(AppError::DuplicateName(item.name));
        }
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item(&self, item: &Item) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.items.get_mut(&item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Item".to_string())),
        }
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.items.remove(&id).is_none() {
            return Err(AppError::NotFound("Item".to_string()));
        }
        Ok(())
    }

    async fn list_purchases(&self, range: Option<DateRange>) -> AppResult<Vec<Purchase>> {
        let inner = self.inner.read().await;
        Ok(inner
            .purchases
            .iter()
            .filter(|p| range.map_or(true, |r| r.contains(p.created_at)))
            .cloned()
            .collect())
    }

    async fn insert_purchase(&self, purchase: Purchase) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.purchases.push(purchase);
        Ok(())
    }

    async fn list_usage(&self, range: Option<DateRange>) -> AppResult<Vec<Usage>> {
        let inner = self.inner.read().await;
        Ok(inner
            .usage
            .iter()
            .filter(|u| range.map_or(true, |r| r.contains(u.created_at)))
            .cloned()
            .collect())
    }

    async fn insert_usage(&self, usage: Usage) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.usage.push(usage);
        Ok(())
    }

    async fn item_has_usage(&self, id: Uuid) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.usage.iter().any(|u| u.ingredient_id == id))
    }

    async fn purchases_for_item(&self, id: Uuid) -> AppResult<Vec<Purchase>> {
        let inner = self.inner.read().await;
        Ok(inner
            .purchases
            .iter()
            .filter(|p| p.ingredient_id == id)
            .cloned()
            .collect())
    }

    async fn usage_for_item(&self, id: Uuid) -> AppResult<Vec<Usage>> {
        let inner = self.inner.read().await;
        Ok(inner
            .usage
            .iter()
            .filter(|u| u.ingredient_id == id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
