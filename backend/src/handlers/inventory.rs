//! HTTP handlers for inventory ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use shared::models::{Item, ReconciliationReport};

use crate::error::AppResult;
use crate::handlers::{ApiResponse, MessageResponse};
use crate::services::{
    filter_items, AddItemInput, AddStockInput, EditItemInput, ItemFilter, UseStockInput,
};
use crate::AppState;

/// List inventory items, optionally filtered by name, unit or stock level
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state.ledger.list_items().await?;
    let items = filter_items(items, &filter)?;
    Ok(Json(items))
}

/// Create a new inventory item
pub async fn add_item(
    State(state): State<AppState>,
    Json(input): Json<AddItemInput>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let item = state.ledger.add_item(input).await?;
    Ok(Json(ApiResponse::new(item)))
}

/// Record a purchase against an item
pub async fn add_stock(
    State(state): State<AppState>,
    Json(input): Json<AddStockInput>,
) -> AppResult<Json<MessageResponse>> {
    state.ledger.add_stock(input).await?;
    Ok(Json(MessageResponse::new("Stock added successfully")))
}

/// Record a stock-out against an item
pub async fn use_stock(
    State(state): State<AppState>,
    Json(input): Json<UseStockInput>,
) -> AppResult<Json<MessageResponse>> {
    state.ledger.use_stock(input).await?;
    Ok(Json(MessageResponse::new("Stock used successfully")))
}

#[derive(Debug, Serialize)]
pub struct EditItemResponse {
    pub success: bool,
    pub data: Item,
    /// Always true: this endpoint writes stock without a ledger row
    pub manual_override: bool,
}

/// Manual-override edit of an item (no ledger row is written)
pub async fn edit_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(input): Json<EditItemInput>,
) -> AppResult<Json<EditItemResponse>> {
    let item = state.ledger.edit_item(item_id, input).await?;
    Ok(Json(EditItemResponse {
        success: true,
        data: item,
        manual_override: true,
    }))
}

/// Delete an item; refused while usage history references it
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.ledger.delete_item(item_id).await?;
    Ok(Json(MessageResponse::new("Item deleted")))
}

/// Compare an item's recorded stock against its ledger history
pub async fn reconcile_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReconciliationReport>>> {
    let report = state.ledger.reconcile(item_id).await?;
    Ok(Json(ApiResponse::new(report)))
}
