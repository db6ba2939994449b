//! Error handling for the Restaurant POS backend
//!
//! Every ledger and reporting failure is a typed `AppError` returned to the
//! caller; nothing is swallowed. Store failures are distinguished from
//! caller mistakes because they are retryable.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Caller mistakes
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate item name: {0}")]
    DuplicateName(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Item has usage history: {0}")]
    HasHistory(String),

    // Store failures (retryable, not the caller's fault)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A coupled write failed part-way and compensation did not restore the
    /// item; its ledger must be reconciled before the balance is trusted.
    #[error("Partial write on item {item_id}: {detail}")]
    PartialWrite { item_id: Uuid, detail: String },

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Field-level validation error
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_reconciliation: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_INPUT".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                    needs_reconciliation: false,
                },
            ),
            AppError::DuplicateName(name) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_NAME".to_string(),
                    message: format!("An item named \"{}\" already exists", name),
                    field: Some("name".to_string()),
                    needs_reconciliation: false,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                    needs_reconciliation: false,
                },
            ),
            AppError::InsufficientStock {
                requested,
                available,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message: format!(
                        "Not enough stock available: requested {}, available {}",
                        requested, available
                    ),
                    field: Some("quantity_used".to_string()),
                    needs_reconciliation: false,
                },
            ),
            AppError::HasHistory(name) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "HAS_HISTORY".to_string(),
                    message: format!("Cannot delete \"{}\": it has usage history", name),
                    field: None,
                    needs_reconciliation: false,
                },
            ),
            AppError::StoreUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORE_UNAVAILABLE".to_string(),
                    message: detail.clone(),
                    field: None,
                    needs_reconciliation: false,
                },
            ),
            AppError::PartialWrite { item_id, detail } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORE_UNAVAILABLE".to_string(),
                    message: format!(
                        "Partial write on item {}: {}. Run reconciliation before trusting its balance.",
                        item_id, detail
                    ),
                    field: None,
                    needs_reconciliation: true,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                    needs_reconciliation: false,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                    needs_reconciliation: false,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
