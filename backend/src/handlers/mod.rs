//! HTTP handlers
//!
//! Thin layer over the services: extract, delegate, wrap in the response
//! envelope the POS clients expect.

pub mod health;
pub mod inventory;
pub mod reports;

pub use health::health_check;
pub use inventory::{
    add_item, add_stock, delete_item, edit_item, list_items, reconcile_item, use_stock,
};
pub use reports::{export_report, get_dashboard, get_report};

use serde::Serialize;

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Envelope for operations with no payload
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
