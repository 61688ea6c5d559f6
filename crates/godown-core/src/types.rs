//! # Domain Types
//!
//! Entity rows, write inputs and joined read models for Godown Inventory.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Supplier ◄─────────── Product ◄──────────── OrderItem ──► Order       │
//! │      ▲        (nullable)    ▲                                  │        │
//! │      │                      │                                  ▼        │
//! │      │ (nullable)     InventoryRecord ──► Warehouse         Customer    │
//! │      └──────────────────────┘                                           │
//! │                                                                         │
//! │   Product total stock = Σ InventoryRecord.quantity_in_stock             │
//! │   (derived by query, never stored)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every relationship is a foreign-key id resolved by query; nothing here
//! holds a pointer to another row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::stock::StockAdjustment;

// =============================================================================
// Supplier
// =============================================================================

/// A company that supplies products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub supplier_id: i64,
    /// Company name.
    pub supplier_name: String,
    /// Contact person.
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub country: Option<String>,
}

/// Supplier form input (insert and update share it).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub supplier_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub country: Option<String>,
}

/// What a supplier deletion touched.
///
/// Rows are detached (their `supplier_id` nulled), never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierDeletion {
    pub supplier_id: i64,
    pub products_detached: u64,
    pub records_detached: u64,
}

// =============================================================================
// Warehouse
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Warehouse {
    pub warehouse_id: i64,
    pub warehouse_name: String,
    pub location: Option<String>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewWarehouse {
    pub warehouse_name: String,
    pub location: Option<String>,
    pub contact_number: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
///
/// Stock is not a column: see [`ProductWithStock::total_stock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub description: Option<String>,
    /// Unit price in cents.
    pub price_cents: i64,
    pub category: Option<String>,
    /// Preferred supplier; nulled when that supplier is deleted.
    pub supplier_id: Option<i64>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Product form input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub product_name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
    pub supplier_id: Option<i64>,
}

/// Product listing row: the product, its supplier's name and the derived
/// total stock across every warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductWithStock {
    pub product_id: i64,
    pub product_name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    /// Σ quantity_in_stock over the product's inventory records (0 if none).
    pub total_stock: i64,
}

// =============================================================================
// Inventory Record
// =============================================================================

/// Stock of one product held in one warehouse.
///
/// A product stocked in three warehouses has three records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryRecord {
    pub record_id: i64,
    pub product_id: i64,
    pub warehouse_id: i64,
    /// Never negative; deductions clamp at zero.
    pub quantity_in_stock: i64,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub supplier_id: Option<i64>,
}

/// Restock / record form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventoryRecord {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity_in_stock: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub supplier_id: Option<i64>,
}

/// Inventory record joined with product and warehouse names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryListing {
    pub record_id: i64,
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity_in_stock: i64,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub supplier_id: Option<i64>,
    pub product_name: String,
    pub category: Option<String>,
    pub price_cents: i64,
    pub warehouse_name: String,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Optional display name override.
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub shipping_address: Option<String>,
    #[ts(as = "Option<String>")]
    pub date_of_birth: Option<NaiveDate>,
}

impl Customer {
    /// Stored display name, or "first last" when none was given.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub shipping_address: Option<String>,
    #[ts(as = "Option<String>")]
    pub date_of_birth: Option<NaiveDate>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
///
/// ```text
/// Pending ──► Shipped ──► Delivered
///    └────────────────────────▲
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Text stored in `orders.order_status`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// Status only moves forward; re-setting the same status is not a move.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        next > *self
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            _ => Err(CoreError::UnknownOrderStatus(s.to_string())),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    /// Σ of the order's line totals, in cents.
    pub total_amount_cents: i64,
    pub shipping_address: Option<String>,
    pub order_status: OrderStatus,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// Order joined with its customer's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderSummary {
    pub order_id: i64,
    pub customer_id: i64,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    pub total_amount_cents: i64,
    pub shipping_address: Option<String>,
    pub order_status: OrderStatus,
    pub customer_name: String,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of an order.
///
/// Snapshot pattern: `item_price_cents` is the product price when the order
/// was placed and `total_price_cents` is frozen with it. Later price edits on
/// the product do not touch existing items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity_ordered: i64,
    pub item_price_cents: i64,
    /// quantity_ordered × item_price_cents.
    pub total_price_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Order item joined with the product name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItemDetail {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity_ordered: i64,
    pub item_price_cents: i64,
    pub total_price_cents: i64,
    pub product_name: String,
}

/// Order with customer name and its items, for the order detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetails {
    pub order: OrderSummary,
    pub items: Vec<OrderItemDetail>,
}

/// One requested line of a prospective order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// Order form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRequest {
    pub customer_id: i64,
    /// Falls back to the customer's shipping address when absent.
    pub shipping_address: Option<String>,
    pub lines: Vec<OrderLine>,
}

/// Outcome of a committed order placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Every inventory record touched by the deduction, in application order.
    pub adjustments: Vec<StockAdjustment>,
}

// =============================================================================
// Alerts & Reports
// =============================================================================

/// An inventory record below the low-stock threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LowStockItem {
    pub record_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub category: Option<String>,
    pub supplier_name: Option<String>,
    pub warehouse_name: String,
    pub quantity_in_stock: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
}

/// An inventory record whose expiry date falls inside the alert window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ExpiringItem {
    pub record_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub category: Option<String>,
    pub warehouse_name: String,
    pub quantity_in_stock: i64,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SupplierProductCount {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub product_count: i64,
}

/// A name with a stock quantity (warehouse or category breakdown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct NamedQuantity {
    pub name: String,
    pub quantity: i64,
}

/// Inventory attributed to one supplier through `inventory_records.supplier_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInventorySummary {
    pub supplier_id: i64,
    pub total_products: i64,
    pub total_stock: i64,
    pub total_value_cents: i64,
    pub warehouses: Vec<NamedQuantity>,
    pub categories: Vec<NamedQuantity>,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_stock: i64,
    pub average_stock_level: i64,
    pub total_inventory_value_cents: i64,
    pub low_stock_count: usize,
    pub expiring_count: usize,
    pub recent_orders: Vec<OrderSummary>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(name: Option<&str>) -> Customer {
        Customer {
            customer_id: 1,
            first_name: "Sarah".to_string(),
            last_name: "Williams".to_string(),
            name: name.map(str::to_string),
            phone_number: None,
            email: None,
            shipping_address: None,
            date_of_birth: None,
        }
    }

    #[test]
    fn test_customer_display_name_falls_back_to_first_last() {
        assert_eq!(customer(None).display_name(), "Sarah Williams");
        assert_eq!(customer(Some("  ")).display_name(), "Sarah Williams");
        assert_eq!(customer(Some("S. Williams")).display_name(), "S. Williams");
    }

    #[test]
    fn test_order_status_moves_forward_only() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Delivered));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_order_status_parsing() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" delivered ".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!(matches!(
            "lost".parse::<OrderStatus>(),
            Err(CoreError::UnknownOrderStatus(_))
        ));
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_serializes_as_stored_text() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"Delivered\"");
        assert_eq!(OrderStatus::Shipped.to_string(), "Shipped");
    }

    #[test]
    fn test_product_price_is_money() {
        let product = Product {
            product_id: 1,
            product_name: "Rice".to_string(),
            description: None,
            price_cents: 1299,
            category: Some("Grains".to_string()),
            supplier_id: Some(3),
        };
        assert_eq!(product.price().to_string(), "$12.99");
    }
}
