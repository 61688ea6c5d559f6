//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Order total with REAL prices:                                          │
//! │    5 × 12.99 + 3 × 8.99 = 91.91999999999999  ❌ WRONG!                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    5 × 1299 + 3 × 899 = 9192 cents = $91.92  ✅                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use godown_core::money::Money;
//!
//! // Prices typed into a form arrive as text
//! let price = Money::parse("12.99").unwrap();
//! assert_eq!(price.cents(), 1299);
//!
//! let line_total = price.multiply_quantity(5).unwrap();
//! assert_eq!(line_total.to_string(), "$64.95");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► OrderItem.item_price_cents (frozen) ──► OrderItem.total_price_cents
///                                                                        │
///                                       Order.total_amount_cents ◄───────┘ (sum)
///
/// Product.price_cents × InventoryRecord.quantity_in_stock ──► inventory value
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use godown_core::money::Money;
    ///
    /// let price = Money::from_cents(1299);
    /// assert_eq!(price.cents(), 1299);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses a decimal amount as typed by a user ("12.99", "5", "0.5").
    ///
    /// ## Rules
    /// - Optional leading `-`
    /// - Digits, optionally followed by `.` and one or two digits
    /// - Anything else is an `InvalidFormat` error
    ///
    /// ## Example
    /// ```rust
    /// use godown_core::money::Money;
    ///
    /// assert_eq!(Money::parse("8.99").unwrap().cents(), 899);
    /// assert_eq!(Money::parse("3.5").unwrap().cents(), 350);
    /// assert_eq!(Money::parse("12").unwrap().cents(), 1200);
    /// assert!(Money::parse("1.999").is_err());
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::invalid_format("price", reason);

        let trimmed = input.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a number like 12.99"));
        }
        if body.contains('.') && fraction.is_empty() {
            return Err(invalid("expected digits after the decimal point"));
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places are allowed"));
        }

        let whole: i64 = whole.parse().map_err(|_| invalid("amount is too large"))?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid("bad cents"))?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Fails with `OutOfRange` instead of wrapping when the line total does
    /// not fit in `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use godown_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(899);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap().cents(), 2697);
    /// assert!(Money::from_cents(i64::MAX / 2).multiply_quantity(3).is_err());
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Result<Self, ValidationError> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or_else(|| overflow("line total"))
    }

    /// Adds two amounts, failing with `OutOfRange` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Result<Self, ValidationError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| overflow("order total"))
    }
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$12.99` (front end handles localisation).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators saturate at the i64 bounds; totals that must be exact go
// through `checked_add`.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1299).to_string(), "$12.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_parse_accepts_form_input() {
        assert_eq!(Money::parse("12.99").unwrap().cents(), 1299);
        assert_eq!(Money::parse(" 3.49 ").unwrap().cents(), 349);
        assert_eq!(Money::parse("0.5").unwrap().cents(), 50);
        assert_eq!(Money::parse("7").unwrap().cents(), 700);
        assert_eq!(Money::parse("-2.10").unwrap().cents(), -210);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "-", ".", "5.", ".99", "1.234", "1,000", "$5", "12a", "+3"] {
            assert!(Money::parse(bad).is_err(), "{bad:?} should not parse");
        }
        assert!(Money::parse("99999999999999999999").is_err());
    }

    /// 5 × $12.99 + 3 × $8.99 must be exactly $91.92.
    #[test]
    fn test_order_total_is_exact() {
        let rice = Money::parse("12.99").unwrap().multiply_quantity(5).unwrap();
        let chicken = Money::parse("8.99").unwrap().multiply_quantity(3).unwrap();

        assert_eq!(rice.cents(), 6495);
        assert_eq!(chicken.cents(), 2697);

        let total: Money = [rice, chicken].into_iter().sum();
        assert_eq!(total.cents(), 9192);
        assert_eq!(total.to_string(), "$91.92");
    }

    #[test]
    fn test_arithmetic() {
        let mut a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a - b).cents(), 750);
        a += b;
        assert_eq!(a.cents(), 1250);
        assert!(Money::from_cents(-1).is_negative());
        assert!(Money::default().is_zero());
    }

    #[test]
    fn test_huge_line_total_is_rejected_not_wrapped() {
        let price = Money::from_cents(5_000_000_000_000_000_000);

        let err = price.multiply_quantity(2).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "line total"));

        let near_max = Money::from_cents(i64::MAX - 10);
        assert!(near_max.checked_add(Money::from_cents(11)).is_err());
        assert_eq!(
            near_max.checked_add(Money::from_cents(10)).unwrap().cents(),
            i64::MAX
        );
    }

    #[test]
    fn test_operators_saturate() {
        let big = Money::from_cents(i64::MAX - 1);
        assert_eq!((big + Money::from_cents(5)).cents(), i64::MAX);

        let total: Money = [big, big].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);
    }
}
