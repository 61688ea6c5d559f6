//! # Demo Data
//!
//! Loads a small, fixed data set into an empty store so every page has
//! something to show on first start.
//!
//! ## Data Set
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  3 suppliers    Fresh Foods Inc, Organic Farms, Global Grains           │
//! │  3 warehouses   Central Warehouse, North Facility, South Storage        │
//! │  6 products     Rice, Wheat Flour, Tomatoes, Apples, Chicken, Milk      │
//! │  6 records      one per product, expiry dated relative to `today`       │
//! │  3 customers    Michael Johnson, Sarah Williams, David Brown            │
//! │  3 orders       Delivered, Shipped, Pending (7 items total)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expiry dates and order dates are offsets from `today`, so the
//! "expiring soon" alert always has Milk, Chicken and Tomatoes in it.
//!
//! Historical orders are inserted as they were placed: they do not deduct
//! stock again. Order totals are the sum of their items.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::Database;
use godown_core::{Money, OrderStatus};

// =============================================================================
// Fixture Tables
// =============================================================================

struct SupplierRow {
    name: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    phone: &'static str,
    email: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    country: &'static str,
}

const SUPPLIERS: &[SupplierRow] = &[
    SupplierRow {
        name: "Fresh Foods Inc",
        first_name: "John",
        last_name: "Doe",
        phone: "555-123-4567",
        email: "john@freshfoods.com",
        address: "123 Main St",
        city: "Boston",
        state: "MA",
        country: "USA",
    },
    SupplierRow {
        name: "Organic Farms",
        first_name: "Jane",
        last_name: "Smith",
        phone: "555-765-4321",
        email: "jane@organicfarms.com",
        address: "456 Oak Ave",
        city: "Portland",
        state: "OR",
        country: "USA",
    },
    SupplierRow {
        name: "Global Grains",
        first_name: "Tom",
        last_name: "Wilson",
        phone: "555-987-6543",
        email: "tom@globalgrains.com",
        address: "789 Pine Rd",
        city: "Chicago",
        state: "IL",
        country: "USA",
    },
];

/// (name, location, contact number)
const WAREHOUSES: &[(&str, &str, &str)] = &[
    ("Central Warehouse", "Downtown", "555-111-2222"),
    ("North Facility", "North District", "555-333-4444"),
    ("South Storage", "South District", "555-555-6666"),
];

/// (name, description, price cents, category, supplier index)
const PRODUCTS: &[(&str, &str, i64, &str, usize)] = &[
    ("Rice", "Premium basmati rice", 1299, "Grains", 2),
    ("Wheat Flour", "All-purpose wheat flour", 599, "Baking", 2),
    ("Tomatoes", "Fresh organic tomatoes", 399, "Vegetables", 1),
    ("Apples", "Red delicious apples", 499, "Fruits", 1),
    ("Chicken", "Free-range chicken", 899, "Meat", 0),
    ("Milk", "Organic whole milk", 349, "Dairy", 0),
];

/// (product index, warehouse index, quantity, supplier index, expires in days)
const RECORDS: &[(usize, usize, i64, usize, i64)] = &[
    (0, 0, 500, 2, 265),
    (1, 0, 300, 2, 188),
    (2, 1, 150, 1, 20),
    (3, 1, 200, 1, 40),
    (4, 2, 100, 0, 15),
    (5, 2, 250, 0, 8),
];

/// (first name, last name, phone, email, shipping address)
const CUSTOMERS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Michael",
        "Johnson",
        "555-111-3333",
        "michael@example.com",
        "123 Pine St, New York, NY",
    ),
    (
        "Sarah",
        "Williams",
        "555-444-6666",
        "sarah@example.com",
        "456 Elm St, Los Angeles, CA",
    ),
    (
        "David",
        "Brown",
        "555-777-9999",
        "david@example.com",
        "789 Maple St, Chicago, IL",
    ),
];

struct OrderRow {
    customer: usize,
    days_ago: i64,
    status: OrderStatus,
    /// (product index, quantity)
    items: &'static [(usize, i64)],
}

const ORDERS: &[OrderRow] = &[
    OrderRow {
        customer: 0,
        days_ago: 45,
        status: OrderStatus::Delivered,
        items: &[(0, 5), (4, 5), (5, 2)],
    },
    OrderRow {
        customer: 1,
        days_ago: 36,
        status: OrderStatus::Shipped,
        items: &[(1, 6), (3, 8)],
    },
    OrderRow {
        customer: 2,
        days_ago: 26,
        status: OrderStatus::Pending,
        items: &[(2, 5), (5, 8)],
    },
];

// =============================================================================
// Seeding
// =============================================================================

/// Rows written per table by [`seed_demo_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub suppliers: usize,
    pub warehouses: usize,
    pub products: usize,
    pub inventory_records: usize,
    pub customers: usize,
    pub orders: usize,
    pub order_items: usize,
}

impl SeedSummary {
    pub fn total(&self) -> usize {
        self.suppliers
            + self.warehouses
            + self.products
            + self.inventory_records
            + self.customers
            + self.orders
            + self.order_items
    }
}

/// Loads the demo data set in one transaction.
///
/// A store that already has products is left alone and an empty summary is
/// returned.
pub async fn seed_demo_data(db: &Database, today: NaiveDate) -> DbResult<SeedSummary> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(db.pool())
        .await?;
    if existing > 0 {
        debug!(existing, "Store already has products, skipping demo data");
        return Ok(SeedSummary::default());
    }

    info!(%today, "Loading demo data");

    let mut tx = db.pool().begin().await?;
    let mut summary = SeedSummary::default();

    let supplier_ids = insert_suppliers(&mut *tx).await?;
    summary.suppliers = supplier_ids.len();

    let mut warehouse_ids = Vec::with_capacity(WAREHOUSES.len());
    for &(name, location, contact) in WAREHOUSES {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO warehouses (warehouse_name, location, contact_number)
            VALUES (?1, ?2, ?3)
            RETURNING warehouse_id
            "#,
        )
        .bind(name)
        .bind(location)
        .bind(contact)
        .fetch_one(&mut *tx)
        .await?;
        warehouse_ids.push(id);
    }
    summary.warehouses = warehouse_ids.len();

    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for &(name, description, price_cents, category, supplier) in PRODUCTS {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (product_name, description, price_cents, category, supplier_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING product_id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price_cents)
        .bind(category)
        .bind(supplier_ids[supplier])
        .fetch_one(&mut *tx)
        .await?;
        product_ids.push(id);
    }
    summary.products = product_ids.len();

    let now = Utc::now();
    for &(product, warehouse, quantity, supplier, expires_in) in RECORDS {
        sqlx::query(
            r#"
            INSERT INTO inventory_records (
                product_id, warehouse_id, quantity_in_stock,
                last_updated, expiry_date, supplier_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(product_ids[product])
        .bind(warehouse_ids[warehouse])
        .bind(quantity)
        .bind(now)
        .bind(today + Duration::days(expires_in))
        .bind(supplier_ids[supplier])
        .execute(&mut *tx)
        .await?;
        summary.inventory_records += 1;
    }

    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for &(first_name, last_name, phone, email, address) in CUSTOMERS {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO customers (
                first_name, last_name, name, phone_number, email, shipping_address
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING customer_id
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(format!("{first_name} {last_name}"))
        .bind(phone)
        .bind(email)
        .bind(address)
        .fetch_one(&mut *tx)
        .await?;
        customer_ids.push(id);
    }
    summary.customers = customer_ids.len();

    for order in ORDERS {
        let order_date = (today - Duration::days(order.days_ago))
            .and_time(NaiveTime::MIN)
            .and_utc();
        let mut total = Money::zero();
        for &(product, quantity) in order.items {
            let line_total =
                Money::from_cents(PRODUCTS[product].2).multiply_quantity(quantity)?;
            total = total.checked_add(line_total)?;
        }

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                customer_id, order_date, total_amount_cents, shipping_address, order_status
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING order_id
            "#,
        )
        .bind(customer_ids[order.customer])
        .bind(order_date)
        .bind(total.cents())
        .bind(CUSTOMERS[order.customer].4)
        .bind(order.status)
        .fetch_one(&mut *tx)
        .await?;
        summary.orders += 1;

        for &(product, quantity) in order.items {
            let price = Money::from_cents(PRODUCTS[product].2);
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, quantity_ordered, item_price_cents, total_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(order_id)
            .bind(product_ids[product])
            .bind(quantity)
            .bind(price.cents())
            .bind(price.multiply_quantity(quantity)?.cents())
            .execute(&mut *tx)
            .await?;
            summary.order_items += 1;
        }
    }

    tx.commit().await?;

    info!(rows = summary.total(), "Demo data loaded");
    Ok(summary)
}

async fn insert_suppliers(conn: &mut SqliteConnection) -> DbResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(SUPPLIERS.len());
    for row in SUPPLIERS {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO suppliers (
                supplier_name, first_name, last_name, contact_phone,
                email, address, city, state, country
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING supplier_id
            "#,
        )
        .bind(row.name)
        .bind(row.first_name)
        .bind(row.last_name)
        .bind(row.phone)
        .bind(row.email)
        .bind(row.address)
        .bind(row.city)
        .bind(row.state)
        .bind(row.country)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}
