//! Domain models for the Restaurant POS Platform

pub mod inventory;
pub mod report;

pub use inventory::*;
pub use report::*;
