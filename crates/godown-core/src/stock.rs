//! # Stock Module
//!
//! The two rules that keep inventory honest: the availability gate and the
//! multi-record deduction.
//!
//! ## Order Placement Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  lines ──► merge_order_lines ──► check_availability (every line)        │
//! │                                        │                                │
//! │                     any short? ────────┼──► InsufficientStock, no write │
//! │                                        ▼                                │
//! │                                   price_lines  (snapshot unit price)    │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                     plan_deduction (per product, record_id order)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Deduction Walk
//! ```text
//! request 5 of Rice
//!
//!   record 1: 3  ──► take 3 ──► 0     remaining 2
//!   record 2: 10 ──► take 2 ──► 8     remaining 0   stop
//!   record 3: 40 ──► untouched
//! ```
//!
//! Everything here is pure. The store feeds in rows and applies the plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::OrderLine;

// =============================================================================
// Deduction Planning
// =============================================================================

/// One inventory record's current quantity, as fed to [`plan_deduction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSlot {
    pub record_id: i64,
    pub quantity: i64,
}

/// A single record's quantity before and after a deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub record_id: i64,
    pub before: i64,
    pub after: i64,
}

impl StockAdjustment {
    /// Units taken from this record.
    #[inline]
    pub fn taken(&self) -> i64 {
        self.before - self.after
    }
}

/// Result of walking a product's records for a requested quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeductionPlan {
    /// Records to update, in walk order. Records left untouched are omitted.
    pub adjustments: Vec<StockAdjustment>,
    /// Units the records could not cover. Zero when availability was checked.
    pub shortfall: i64,
}

impl DeductionPlan {
    /// Units actually taken across all records.
    pub fn absorbed(&self) -> i64 {
        self.adjustments.iter().map(StockAdjustment::taken).sum()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.shortfall == 0
    }
}

/// Plans a deduction of `requested` units across `slots` in the given order.
///
/// Each record gives up `min(quantity, remaining)`; the walk stops as soon as
/// nothing remains. Quantities never go below zero: anything the records
/// cannot cover ends up in [`DeductionPlan::shortfall`].
///
/// Callers pass slots sorted by `record_id` so the walk is deterministic.
pub fn plan_deduction(slots: &[StockSlot], requested: i64) -> DeductionPlan {
    let mut remaining = requested.max(0);
    let mut adjustments = Vec::new();

    for slot in slots {
        if remaining == 0 {
            break;
        }
        let available = slot.quantity.max(0);
        if available == 0 {
            continue;
        }

        let take = available.min(remaining);
        remaining -= take;
        adjustments.push(StockAdjustment {
            record_id: slot.record_id,
            before: slot.quantity,
            after: slot.quantity - take,
        });
    }

    DeductionPlan {
        adjustments,
        shortfall: remaining,
    }
}

// =============================================================================
// Availability Gate
// =============================================================================

/// Rejects a line whose requested quantity exceeds the product's total stock.
///
/// Requesting exactly the available amount is allowed.
pub fn check_availability(product: &str, available: i64, requested: i64) -> CoreResult<()> {
    if requested > available {
        return Err(CoreError::InsufficientStock {
            product: product.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Order Lines
// =============================================================================

/// Collapses repeated products into one line, keeping first-seen order.
///
/// Two lines for the same product must pass the gate on their combined
/// quantity, so they are checked as one.
pub fn merge_order_lines(lines: &[OrderLine]) -> Vec<OrderLine> {
    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    let mut index: BTreeMap<i64, usize> = BTreeMap::new();

    for line in lines {
        match index.get(&line.product_id) {
            Some(&i) => merged[i].quantity += line.quantity,
            None => {
                index.insert(line.product_id, merged.len());
                merged.push(*line);
            }
        }
    }

    merged
}

/// A line with its unit price frozen at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Prices each line and returns the lines with the order total.
///
/// `prices` holds `(product_id, unit_price)` pairs; a line whose product is
/// missing from it is skipped, since the store resolves products first.
/// A line total or order total that overflows `i64` cents is an
/// `OutOfRange` validation error.
pub fn price_lines(
    lines: &[OrderLine],
    prices: &[(i64, Money)],
) -> CoreResult<(Vec<PricedLine>, Money)> {
    let lookup: BTreeMap<i64, Money> = prices.iter().copied().collect();

    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Money::zero();
    for line in lines {
        let Some(&unit_price) = lookup.get(&line.product_id) else {
            continue;
        };
        let line_total = unit_price.multiply_quantity(line.quantity)?;
        total = total.checked_add(line_total)?;
        priced.push(PricedLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price,
            line_total,
        });
    }

    Ok((priced, total))
}

// =============================================================================
// Unit Tests
// =============================================================================
