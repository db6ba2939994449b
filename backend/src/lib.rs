//! Restaurant POS Backend
//!
//! Inventory ledger for a restaurant point-of-sale system: items with
//! running stock balances, immutable purchase and usage events, dashboard
//! metrics, period reports and CSV export, served over HTTP.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::{LedgerService, MetricsService};
use store::InventoryStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn InventoryStore>,
    pub ledger: Arc<LedgerService>,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn InventoryStore>) -> Self {
        Self {
            config: Arc::new(config),
            ledger: Arc::new(LedgerService::new(store.clone())),
            metrics: Arc::new(MetricsService::new(store.clone())),
            store,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Restaurant POS API v1.0"
}
