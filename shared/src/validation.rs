//! Validation helpers for the inventory ledger

use rust_decimal::Decimal;

/// Validate an ingredient name (non-empty after trimming)
pub fn validate_item_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name must not be empty");
    }
    Ok(())
}

/// Validate a quantity that must be strictly positive
pub fn validate_positive(value: Decimal) -> Result<(), &'static str> {
    if value <= Decimal::ZERO {
        return Err("Value must be positive");
    }
    Ok(())
}

/// Validate a value that must not be negative
pub fn validate_non_negative(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Value must not be negative");
    }
    Ok(())
}

/// Validate a supplier name (required, non-empty after trimming)
pub fn validate_supplier(supplier: &str) -> Result<(), &'static str> {
    if supplier.trim().is_empty() {
        return Err("Supplier must not be empty");
    }
    Ok(())
}

/// Normalize an optional free-text field: trim, map empty to None
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
