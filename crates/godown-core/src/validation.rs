//! # Validation Module
//!
//! Input re-validation for Godown Inventory.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser forms                                                 │
//! │  ├── Required fields, number inputs                                     │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store operations (Rust)                                       │
//! │  └── THIS MODULE: names, quantities, prices, order lines                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  ├── CHECK (quantity_in_stock >= 0)                                     │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use godown_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("product_name", "Basmati Rice").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{
    NewCustomer, NewInventoryRecord, NewProduct, NewSupplier, NewWarehouse, OrderLine,
    OrderRequest,
};
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name or free-text field.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use godown_core::validation::validate_name;
///
/// assert!(validate_name("warehouse_name", "Main Warehouse").is_ok());
/// assert!(validate_name("warehouse_name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional e-mail address: absent or blank is fine, otherwise
/// it needs an `@` with something on both sides.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::invalid_format(
            "email",
            "must look like name@example.com",
        )),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an ordered or deducted quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (1,000,000)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level for an inventory record. Zero is allowed.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity_in_stock".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity_in_stock".to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed MAX_PRICE_CENTS ($100,000,000.00)
///
/// ## Example
/// ```rust
/// use godown_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1299).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(5_000_000_000_000_000_000).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a report threshold (stock level or day count).
pub fn validate_threshold(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a report window such as "expiring within N days".
pub fn validate_window(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    validate_threshold(field, value)?;

    if value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

pub fn validate_new_supplier(input: &NewSupplier) -> ValidationResult<()> {
    validate_name("supplier_name", &input.supplier_name)?;
    validate_email(input.email.as_deref())
}

pub fn validate_new_warehouse(input: &NewWarehouse) -> ValidationResult<()> {
    validate_name("warehouse_name", &input.warehouse_name)
}

pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_name("product_name", &input.product_name)?;
    validate_price_cents(input.price_cents)
}

pub fn validate_new_inventory_record(input: &NewInventoryRecord) -> ValidationResult<()> {
    validate_stock_quantity(input.quantity_in_stock)
}

pub fn validate_new_customer(input: &NewCustomer) -> ValidationResult<()> {
    validate_name("first_name", &input.first_name)?;
    validate_name("last_name", &input.last_name)?;
    validate_email(input.email.as_deref())
}

/// Validates order lines before the stock gate sees them.
///
/// ## Rules
/// - At least one line, at most MAX_ORDER_LINES (100)
/// - Every quantity passes [`validate_quantity`]
pub fn validate_order_lines(lines: &[OrderLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }

    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::TooManyLines {
            max: MAX_ORDER_LINES,
        });
    }

    lines.iter().try_for_each(|line| validate_quantity(line.quantity))
}

pub fn validate_order_request(request: &OrderRequest) -> ValidationResult<()> {
    validate_order_lines(&request.lines)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_EXPIRY_WINDOW_DAYS, MAX_LOOKBACK_HOURS};

    #[test]
    fn test_validate_name() {
        assert!(validate_name("product_name", "Fresh Milk").is_ok());
        assert!(validate_name("product_name", "").is_err());
        assert!(validate_name("product_name", &"A".repeat(201)).is_err());
        assert!(validate_name("product_name", &"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(None).is_ok());
        assert!(validate_email(Some("  ")).is_ok());
        assert!(validate_email(Some("john@globalfoods.com")).is_ok());
        assert!(validate_email(Some("john.globalfoods.com")).is_err());
        assert!(validate_email(Some("@globalfoods.com")).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_stock_quantity_allows_zero() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(matches!(
            validate_stock_quantity(-5),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold("days", 0).is_ok());
        assert!(validate_threshold("days", -1).is_err());
    }

    #[test]
    fn test_validate_window() {
        assert!(validate_window("days", 0, MAX_EXPIRY_WINDOW_DAYS).is_ok());
        assert!(validate_window("days", MAX_EXPIRY_WINDOW_DAYS, MAX_EXPIRY_WINDOW_DAYS).is_ok());
        assert!(matches!(
            validate_window("days", 200_000_000, MAX_EXPIRY_WINDOW_DAYS),
            Err(ValidationError::OutOfRange { max: MAX_EXPIRY_WINDOW_DAYS, .. })
        ));
        assert!(matches!(
            validate_window("hours", -1, MAX_LOOKBACK_HOURS),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_order_lines() {
        assert!(matches!(
            validate_order_lines(&[]),
            Err(ValidationError::EmptyOrder)
        ));

        let ok = [OrderLine { product_id: 1, quantity: 5 }];
        assert!(validate_order_lines(&ok).is_ok());

        let zero = [
            OrderLine { product_id: 1, quantity: 5 },
            OrderLine { product_id: 2, quantity: 0 },
        ];
        assert!(validate_order_lines(&zero).is_err());

        let many: Vec<OrderLine> = (0..=MAX_ORDER_LINES as i64)
            .map(|id| OrderLine { product_id: id, quantity: 1 })
            .collect();
        assert!(matches!(
            validate_order_lines(&many),
            Err(ValidationError::TooManyLines { .. })
        ));
    }

    #[test]
    fn test_validate_new_product() {
        let mut input = NewProduct {
            product_name: "Organic Apples".to_string(),
            price_cents: 499,
            ..Default::default()
        };
        assert!(validate_new_product(&input).is_ok());

        input.price_cents = -1;
        assert!(validate_new_product(&input).is_err());

        input.price_cents = MAX_PRICE_CENTS;
        assert!(validate_new_product(&input).is_ok());

        input.price_cents = 5_000_000_000_000_000_000;
        assert!(matches!(
            validate_new_product(&input),
            Err(ValidationError::OutOfRange { max: MAX_PRICE_CENTS, .. })
        ));
    }
}
