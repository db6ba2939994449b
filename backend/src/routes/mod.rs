//! Route definitions for the Restaurant POS backend

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Inventory ledger
        .nest("/inventory", inventory_routes())
}

/// Inventory ledger, reporting and export routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items))
        .route("/add-item", post(handlers::add_item))
        .route("/add-stock", post(handlers::add_stock))
        .route("/use-stock", post(handlers::use_stock))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/reports", get(handlers::get_report))
        .route("/reports/export", get(handlers::export_report))
        .route(
            "/:item_id",
            axum::routing::put(handlers::edit_item).delete(handlers::delete_item),
        )
        .route("/:item_id/reconcile", get(handlers::reconcile_item))
}
