//! # Inventory Repository
//!
//! Database operations for inventory records: one row per product per
//! warehouse, each with its own quantity and expiry date.
//!
//! ## Stock Deduction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  deduct_stock(Rice, 5)                     (one transaction)            │
//! │                                                                         │
//! │  SELECT records for Rice ORDER BY record_id                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  godown_core::stock::plan_deduction(slots, 5)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE each touched record (quantity, last_updated)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ──► StockDeduction { adjustments, shortfall }                   │
//! │                                                                         │
//! │  Standalone deductions are best-effort: they clamp at zero and report   │
//! │  the shortfall. Order placement checks availability first instead.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use godown_core::stock::{plan_deduction, DeductionPlan, StockAdjustment, StockSlot};
use godown_core::validation::{validate_new_inventory_record, validate_quantity};
use godown_core::{InventoryListing, InventoryRecord, NewInventoryRecord};

const RECORD_COLUMNS: &str = "record_id, product_id, warehouse_id, quantity_in_stock, \
     last_updated, expiry_date, supplier_id";

pub(crate) const LISTING_SELECT: &str = r#"
    SELECT
        ir.record_id,
        ir.product_id,
        ir.warehouse_id,
        ir.quantity_in_stock,
        ir.last_updated,
        ir.expiry_date,
        ir.supplier_id,
        p.product_name,
        p.category,
        p.price_cents,
        w.warehouse_name
    FROM inventory_records ir
    JOIN products p ON p.product_id = ir.product_id
    JOIN warehouses w ON w.warehouse_id = ir.warehouse_id
"#;

/// Outcome of a standalone stock deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockDeduction {
    pub product_id: i64,
    pub requested: i64,
    pub adjustments: Vec<StockAdjustment>,
    /// Units no record could cover.
    pub shortfall: i64,
}

/// Repository for inventory record operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Adds a stock record (restock into a warehouse).
    pub async fn insert(&self, input: &NewInventoryRecord) -> DbResult<InventoryRecord> {
        validate_new_inventory_record(input)?;
        debug!(
            product_id = input.product_id,
            warehouse_id = input.warehouse_id,
            quantity = input.quantity_in_stock,
            "Inserting inventory record"
        );

        let sql = format!(
            r#"
            INSERT INTO inventory_records (
                product_id, warehouse_id, quantity_in_stock,
                last_updated, expiry_date, supplier_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {RECORD_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(input.product_id)
            .bind(input.warehouse_id)
            .bind(input.quantity_in_stock)
            .bind(Utc::now())
            .bind(input.expiry_date)
            .bind(input.supplier_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    /// Replaces a record's fields and refreshes `last_updated`.
    pub async fn update(&self, id: i64, input: &NewInventoryRecord) -> DbResult<InventoryRecord> {
        validate_new_inventory_record(input)?;
        debug!(id, quantity = input.quantity_in_stock, "Updating inventory record");

        let sql = format!(
            r#"
            UPDATE inventory_records SET
                product_id = ?2,
                warehouse_id = ?3,
                quantity_in_stock = ?4,
                last_updated = ?5,
                expiry_date = ?6,
                supplier_id = ?7
            WHERE record_id = ?1
            RETURNING {RECORD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(id)
            .bind(input.product_id)
            .bind(input.warehouse_id)
            .bind(input.quantity_in_stock)
            .bind(Utc::now())
            .bind(input.expiry_date)
            .bind(input.supplier_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory record", id))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<InventoryRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM inventory_records WHERE record_id = ?1");
        let record = sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Lists every record with product and warehouse names.
    pub async fn list(&self) -> DbResult<Vec<InventoryListing>> {
        let sql = format!("{LISTING_SELECT} ORDER BY ir.record_id");
        let records = sqlx::query_as::<_, InventoryListing>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    pub async fn list_by_product(&self, product_id: i64) -> DbResult<Vec<InventoryListing>> {
        self.list_where("ir.product_id = ?1", product_id).await
    }

    pub async fn list_by_warehouse(&self, warehouse_id: i64) -> DbResult<Vec<InventoryListing>> {
        self.list_where("ir.warehouse_id = ?1", warehouse_id).await
    }

    /// Records attributed to a supplier through `inventory_records.supplier_id`.
    pub async fn list_by_supplier(&self, supplier_id: i64) -> DbResult<Vec<InventoryListing>> {
        self.list_where("ir.supplier_id = ?1", supplier_id).await
    }

    async fn list_where(&self, condition: &str, id: i64) -> DbResult<Vec<InventoryListing>> {
        let sql = format!("{LISTING_SELECT} WHERE {condition} ORDER BY ir.record_id");
        let records = sqlx::query_as::<_, InventoryListing>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Total stock of a product across all warehouses (0 with no records).
    pub async fn total_stock(&self, product_id: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        total_stock_on(&mut *conn, product_id).await
    }

    /// Removes up to `quantity` units of a product, walking its records in id
    /// order.
    ///
    /// Best-effort: quantities never go below zero, and whatever the records
    /// could not cover comes back as `shortfall` instead of an error.
    pub async fn deduct_stock(&self, product_id: i64, quantity: i64) -> DbResult<StockDeduction> {
        validate_quantity(quantity)?;
        debug!(product_id, quantity, "Deducting stock");

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT product_id FROM products WHERE product_id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let slots = load_slots(&mut *tx, product_id).await?;
        let plan = plan_deduction(&slots, quantity);
        apply_plan(&mut *tx, &plan, Utc::now()).await?;

        tx.commit().await?;

        if plan.shortfall > 0 {
            warn!(
                product_id,
                requested = quantity,
                shortfall = plan.shortfall,
                "Stock deduction fell short"
            );
        } else {
            info!(product_id, quantity, records = plan.adjustments.len(), "Stock deducted");
        }

        Ok(StockDeduction {
            product_id,
            requested: quantity,
            adjustments: plan.adjustments,
            shortfall: plan.shortfall,
        })
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================
// These run on a connection the caller already holds (usually a transaction),
// so order placement can reuse them without touching the pool.

/// Σ quantity_in_stock for a product.
pub(crate) async fn total_stock_on(conn: &mut SqliteConnection, product_id: i64) -> DbResult<i64> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity_in_stock), 0) FROM inventory_records WHERE product_id = ?1",
    )
    .bind(product_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}

/// A product's records as deduction slots, in record id order.
pub(crate) async fn load_slots(
    conn: &mut SqliteConnection,
    product_id: i64,
) -> DbResult<Vec<StockSlot>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT record_id, quantity_in_stock
        FROM inventory_records
        WHERE product_id = ?1
        ORDER BY record_id
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(record_id, quantity)| StockSlot { record_id, quantity })
        .collect())
}

/// Writes every adjustment of a plan, stamping `last_updated`.
pub(crate) async fn apply_plan(
    conn: &mut SqliteConnection,
    plan: &DeductionPlan,
    now: DateTime<Utc>,
) -> DbResult<()> {
    for adjustment in &plan.adjustments {
        sqlx::query(
            r#"
            UPDATE inventory_records
            SET quantity_in_stock = ?2, last_updated = ?3
            WHERE record_id = ?1
            "#,
        )
        .bind(adjustment.record_id)
        .bind(adjustment.after)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        debug!(
            record_id = adjustment.record_id,
            before = adjustment.before,
            after = adjustment.after,
            "Adjusted inventory record"
        );
    }

    Ok(())
}
