//! # Order Repository
//!
//! Order placement, order history and fulfilment status.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place_order(request)                        ONE transaction            │
//! │                                                                         │
//! │  validate lines, merge duplicate products                               │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │  (a) customer exists?  every product exists?                            │
//! │      Σ stock ≥ quantity for EVERY line? ──── no ──► ROLLBACK            │
//! │       │                                          InsufficientStock      │
//! │       ▼                                          (zero rows written)    │
//! │  (b) INSERT order (Pending) + items with frozen unit prices             │
//! │       │                                                                 │
//! │  (c) per line: plan_deduction over records by id, UPDATE records        │
//! │      (any shortfall here ──► ROLLBACK)                                  │
//! │       │                                                                 │
//! │  COMMIT ──► PlacedOrder { order, items, adjustments }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Either the whole order lands (order row, every item, every stock change)
//! or none of it does.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::inventory::{apply_plan, load_slots, total_stock_on};
use crate::error::{DbError, DbResult};
use godown_core::stock::{check_availability, merge_order_lines, plan_deduction, price_lines};
use godown_core::validation::{validate_order_request, validate_quantity};
use godown_core::{
    CoreError, Money, Order, OrderDetails, OrderItem, OrderItemDetail, OrderRequest,
    OrderStatus, OrderSummary, PlacedOrder,
};

const ORDER_COLUMNS: &str =
    "order_id, customer_id, order_date, total_amount_cents, shipping_address, order_status";

const ORDER_ITEM_COLUMNS: &str =
    "order_item_id, order_id, product_id, quantity_ordered, item_price_cents, total_price_cents";

pub(crate) const ORDER_SUMMARY_SELECT: &str = r#"
    SELECT
        o.order_id,
        o.customer_id,
        o.order_date,
        o.total_amount_cents,
        o.shipping_address,
        o.order_status,
        COALESCE(NULLIF(TRIM(c.name), ''), c.first_name || ' ' || c.last_name) AS customer_name
    FROM orders o
    JOIN customers c ON c.customer_id = o.customer_id
"#;

/// Repository for order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Places an order: stock gate, order + items, stock deduction.
    ///
    /// ## Errors
    /// * `DbError::Core(InsufficientStock)` - some line asks for more than
    ///   the product's total stock; nothing is written
    /// * `DbError::NotFound` - unknown customer or product
    /// * `DbError::Core(Validation)` - empty order, bad quantity
    pub async fn place_order(&self, request: &OrderRequest) -> DbResult<PlacedOrder> {
        validate_order_request(request)?;

        let lines = merge_order_lines(&request.lines);
        for line in &lines {
            validate_quantity(line.quantity)?;
        }

        debug!(
            customer_id = request.customer_id,
            lines = lines.len(),
            "Placing order"
        );

        let mut tx = self.pool.begin().await?;

        // ---------------------------------------------------------------------
        // (a) Resolve and gate every line before writing anything
        // ---------------------------------------------------------------------

        let customer: Option<(Option<String>,)> =
            sqlx::query_as("SELECT shipping_address FROM customers WHERE customer_id = ?1")
                .bind(request.customer_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (customer_address,) =
            customer.ok_or_else(|| DbError::not_found("Customer", request.customer_id))?;

        let mut names: HashMap<i64, String> = HashMap::with_capacity(lines.len());
        let mut prices: Vec<(i64, Money)> = Vec::with_capacity(lines.len());

        for line in &lines {
            let product: Option<(String, i64)> = sqlx::query_as(
                "SELECT product_name, price_cents FROM products WHERE product_id = ?1",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?;
            let (name, price_cents) =
                product.ok_or_else(|| DbError::not_found("Product", line.product_id))?;

            let available = total_stock_on(&mut *tx, line.product_id).await?;
            if let Err(err) = check_availability(&name, available, line.quantity) {
                warn!(
                    product_id = line.product_id,
                    available,
                    requested = line.quantity,
                    "Order rejected: insufficient stock"
                );
                return Err(err.into());
            }

            prices.push((line.product_id, Money::from_cents(price_cents)));
            names.insert(line.product_id, name);
        }

        let (priced, total) = price_lines(&lines, &prices)?;

        // ---------------------------------------------------------------------
        // (b) Order row and items, prices frozen
        // ---------------------------------------------------------------------

        let now = Utc::now();
        let shipping_address = request
            .shipping_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .or(customer_address);

        let insert_order = format!(
            r#"
            INSERT INTO orders (
                customer_id, order_date, total_amount_cents, shipping_address, order_status
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, Order>(&insert_order)
            .bind(request.customer_id)
            .bind(now)
            .bind(total.cents())
            .bind(&shipping_address)
            .bind(OrderStatus::Pending)
            .fetch_one(&mut *tx)
            .await?;

        let insert_item = format!(
            r#"
            INSERT INTO order_items (
                order_id, product_id, quantity_ordered, item_price_cents, total_price_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {ORDER_ITEM_COLUMNS}
            "#
        );
        let mut items = Vec::with_capacity(priced.len());
        for line in &priced {
            let item = sqlx::query_as::<_, OrderItem>(&insert_item)
                .bind(order.order_id)
                .bind(line.product_id)
                .bind(line.quantity)
                .bind(line.unit_price.cents())
                .bind(line.line_total.cents())
                .fetch_one(&mut *tx)
                .await?;
            items.push(item);
        }

        // ---------------------------------------------------------------------
        // (c) Deduct stock record by record
        // ---------------------------------------------------------------------

        let mut adjustments = Vec::new();
        for line in &priced {
            let slots = load_slots(&mut *tx, line.product_id).await?;
            let plan = plan_deduction(&slots, line.quantity);

            if !plan.is_complete() {
                return Err(CoreError::InsufficientStock {
                    product: names.remove(&line.product_id).unwrap_or_default(),
                    available: plan.absorbed(),
                    requested: line.quantity,
                }
                .into());
            }

            apply_plan(&mut *tx, &plan, now).await?;
            adjustments.extend(plan.adjustments);
        }

        tx.commit().await?;

        info!(
            order_id = order.order_id,
            customer_id = order.customer_id,
            items = items.len(),
            total = %order.total_amount(),
            "Order placed"
        );

        Ok(PlacedOrder {
            order,
            items,
            adjustments,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Order with customer name and its items.
    pub async fn get_details(&self, id: i64) -> DbResult<Option<OrderDetails>> {
        let sql = format!("{ORDER_SUMMARY_SELECT} WHERE o.order_id = ?1");
        let Some(order) = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self.items(id).await?;
        Ok(Some(OrderDetails { order, items }))
    }

    /// Newest orders first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<OrderSummary>> {
        let sql = format!(
            "{ORDER_SUMMARY_SELECT} ORDER BY datetime(o.order_date) DESC, o.order_id DESC LIMIT ?1"
        );
        let orders = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Every order, newest first.
    pub async fn list(&self) -> DbResult<Vec<OrderSummary>> {
        let sql = format!(
            "{ORDER_SUMMARY_SELECT} ORDER BY datetime(o.order_date) DESC, o.order_id DESC"
        );
        let orders = sqlx::query_as::<_, OrderSummary>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Items of an order with product names, in insertion order.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<OrderItemDetail>> {
        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT
                oi.order_item_id,
                oi.order_id,
                oi.product_id,
                oi.quantity_ordered,
                oi.item_price_cents,
                oi.total_price_cents,
                p.product_name
            FROM order_items oi
            JOIN products p ON p.product_id = oi.product_id
            WHERE oi.order_id = ?1
            ORDER BY oi.order_item_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Moves an order forward (Pending → Shipped → Delivered).
    ///
    /// ## Errors
    /// * `DbError::NotFound` - unknown order
    /// * `DbError::Core(InvalidStatusTransition)` - backwards or same status
    pub async fn update_status(&self, id: i64, next: OrderStatus) -> DbResult<Order> {
        debug!(id, status = %next, "Updating order status");

        let mut tx = self.pool.begin().await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT order_status FROM orders WHERE order_id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or_else(|| DbError::not_found("Order", id))?;

        if !current.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                order_id: id,
                from: current,
                to: next,
            }
            .into());
        }

        let sql = format!(
            "UPDATE orders SET order_status = ?2 WHERE order_id = ?1 RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(order_id = id, from = %current, to = %next, "Order status changed");
        Ok(order)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, Database, DbConfig};
    use chrono::NaiveDate;
    use godown_core::{OrderLine, ValidationError};

    async fn seeded() -> Database {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        fixtures::seed_demo_data(&db, today).await.unwrap();
        db
    }

    fn request(customer_id: i64, lines: &[(i64, i64)]) -> OrderRequest {
        OrderRequest {
            customer_id,
            shipping_address: None,
            lines: lines
                .iter()
                .map(|&(product_id, quantity)| OrderLine { product_id, quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_place_order_happy_path() {
        let db = seeded().await;

        // 5 × Rice ($12.99) + 3 × Chicken ($8.99)
        let placed = db
            .orders()
            .place_order(&request(1, &[(1, 5), (5, 3)]))
            .await
            .unwrap();

        assert_eq!(placed.order.total_amount_cents, 9192);
        assert_eq!(placed.order.order_status, OrderStatus::Pending);
        assert_eq!(
            placed.order.shipping_address.as_deref(),
            Some("123 Pine St, New York, NY")
        );
        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.items[0].item_price_cents, 1299);
        assert_eq!(placed.items[0].total_price_cents, 6495);
        assert_eq!(placed.items[1].total_price_cents, 2697);

        assert_eq!(db.inventory().total_stock(1).await.unwrap(), 495);
        assert_eq!(db.inventory().total_stock(5).await.unwrap(), 97);
        assert_eq!(placed.adjustments.len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = seeded().await;
        let orders_before = db.orders().count().await.unwrap();

        // Rice is fine, Chicken (100) is not
        let err = db
            .orders()
            .place_order(&request(2, &[(1, 5), (5, 101)]))
            .await
            .unwrap_err();

        assert!(err.is_insufficient_stock());
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Chicken: available 100, requested 101"
        );
        assert_eq!(db.orders().count().await.unwrap(), orders_before);
        assert_eq!(db.inventory().total_stock(1).await.unwrap(), 500);
        assert_eq!(db.inventory().total_stock(5).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_exact_stock_is_allowed() {
        let db = seeded().await;

        db.orders().place_order(&request(3, &[(6, 250)])).await.unwrap();
        assert_eq!(db.inventory().total_stock(6).await.unwrap(), 0);

        let err = db.orders().place_order(&request(3, &[(6, 1)])).await.unwrap_err();
        assert!(err.is_insufficient_stock());
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_gated_together() {
        let db = seeded().await;

        // 60 + 60 Chicken exceeds 100 even though each line fits
        let err = db
            .orders()
            .place_order(&request(1, &[(5, 60), (5, 60)]))
            .await
            .unwrap_err();
        assert!(err.is_insufficient_stock());

        let placed = db
            .orders()
            .place_order(&request(1, &[(5, 30), (5, 20)]))
            .await
            .unwrap();
        assert_eq!(placed.items.len(), 1);
        assert_eq!(placed.items[0].quantity_ordered, 50);
    }

    #[tokio::test]
    async fn test_unknown_customer_or_product() {
        let db = seeded().await;

        let err = db.orders().place_order(&request(99, &[(1, 1)])).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.orders().place_order(&request(1, &[(99, 1)])).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert_eq!(db.orders().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let db = seeded().await;
        let err = db.orders().place_order(&request(1, &[])).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_oversized_price_is_rejected_on_insert() {
        let db = seeded().await;

        let err = db
            .products()
            .insert(&godown_core::NewProduct {
                product_name: "Saffron Crate".to_string(),
                price_cents: 5_000_000_000_000_000_000,
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert_eq!(db.products().count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_overflowing_order_total_writes_nothing() {
        let db = seeded().await;
        let orders_before = db.orders().count().await.unwrap();

        // A price row written outside the repository (older store, imported file)
        let product_id: i64 = sqlx::query_scalar(
            "INSERT INTO products (product_name, price_cents) VALUES ('Saffron Crate', ?1) \
             RETURNING product_id",
        )
        .bind(5_000_000_000_000_000_000_i64)
        .fetch_one(db.pool())
        .await
        .unwrap();
        db.inventory()
            .insert(&godown_core::NewInventoryRecord {
                product_id,
                warehouse_id: 1,
                quantity_in_stock: 10,
                expiry_date: None,
                supplier_id: None,
            })
            .await
            .unwrap();

        let err = db
            .orders()
            .place_order(&request(1, &[(product_id, 2)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(db.orders().count().await.unwrap(), orders_before);
        assert_eq!(db.inventory().total_stock(product_id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_explicit_shipping_address_wins() {
        let db = seeded().await;
        let mut req = request(2, &[(4, 1)]);
        req.shipping_address = Some("Dock 4, Pier Rd".to_string());

        let placed = db.orders().place_order(&req).await.unwrap();
        assert_eq!(placed.order.shipping_address.as_deref(), Some("Dock 4, Pier Rd"));
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let db = seeded().await;
        let placed = db.orders().place_order(&request(2, &[(2, 1)])).await.unwrap();

        let recent = db.orders().recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].order_id, placed.order.order_id);
        assert_eq!(recent[0].customer_name, "Sarah Williams");
        assert_eq!(db.orders().list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_order_details() {
        let db = seeded().await;
        let details = db.orders().get_details(1).await.unwrap().unwrap();

        assert_eq!(details.order.customer_name, "Michael Johnson");
        assert_eq!(details.items.len(), 3);
        assert_eq!(details.items[0].product_name, "Rice");

        let sum: i64 = details.items.iter().map(|i| i.total_price_cents).sum();
        assert_eq!(sum, details.order.total_amount_cents);

        assert!(db.orders().get_details(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_moves_forward_only() {
        let db = seeded().await;

        // Order 3 is Pending
        let shipped = db.orders().update_status(3, OrderStatus::Shipped).await.unwrap();
        assert_eq!(shipped.order_status, OrderStatus::Shipped);

        let err = db.orders().update_status(3, OrderStatus::Pending).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidStatusTransition { .. })
        ));

        // Order 1 is Delivered
        assert!(db.orders().update_status(1, OrderStatus::Shipped).await.is_err());
        assert!(matches!(
            db.orders().update_status(77, OrderStatus::Shipped).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
