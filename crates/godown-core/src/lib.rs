//! # godown-core: Pure Business Logic for Godown Inventory
//!
//! This crate holds the inventory rules as pure functions with zero I/O
//! dependencies. The database layer (`godown-db`) loads rows, asks this crate
//! what to do with them, and writes the answer back.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Godown Inventory Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser front end (separate)                    │   │
//! │  │   Dashboard ──► Products ──► Inventory ──► Orders ──► Alerts    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ function calls                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 godown-db (Database Layer)                      │   │
//! │  │    repositories, place_order, delete_cascade, snapshots        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ godown-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   stock   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  gate     │  │   rules   │  │   │
//! │  │   │  Order    │  │  (cents)  │  │  deduct   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity and read-model types (Product, InventoryRecord, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stock`] - Availability gate, multi-record deduction planning, order pricing
//! - [`error`] - Domain error types
//! - [`validation`] - Input re-validation at the core boundary
//!
//! ## Example Usage
//!
//! ```rust
//! use godown_core::stock::{plan_deduction, StockSlot};
//!
//! // Rice is stocked in two warehouses
//! let slots = [
//!     StockSlot { record_id: 1, quantity: 3 },
//!     StockSlot { record_id: 2, quantity: 10 },
//! ];
//!
//! let plan = plan_deduction(&slots, 5);
//! assert_eq!(plan.absorbed(), 5);
//! assert_eq!(plan.adjustments[0].after, 0);
//! assert_eq!(plan.adjustments[1].after, 8);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Records below this quantity are reported as low stock on the dashboard.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 100;

/// The alerts page uses a wider net than the dashboard.
pub const DEFAULT_ALERT_STOCK_THRESHOLD: i64 = 150;

/// Records expiring within this many days are flagged as expiring soon.
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

/// Number of orders shown in the "recent orders" panel.
pub const DEFAULT_RECENT_ORDERS_LIMIT: u32 = 10;

/// Maximum distinct lines in a single order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity for a single order line or stock movement.
///
/// ## Business Reason
/// Catches typos (an extra zero or three) before they reach the stock gate.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Highest unit price a product may carry ($100,000,000.00).
///
/// Keeps `price × MAX_LINE_QUANTITY × MAX_ORDER_LINES` well inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Widest expiry window a report or settings file may ask for (100 years).
pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 36_500;

/// Longest "recently updated" look-back (100 years).
pub const MAX_LOOKBACK_HOURS: i64 = MAX_EXPIRY_WINDOW_DAYS * 24;
