//! Shared types and models for the Restaurant POS Platform
//!
//! This crate contains the domain models shared between the backend service
//! and its tests: the inventory ledger records, the reporting/dashboard
//! shapes, and the validation helpers that guard them.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
