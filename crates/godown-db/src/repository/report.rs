//! # Report Repository
//!
//! Read-only statistics for the dashboard, alerts page and supplier views.
//!
//! ## Where Each Number Comes From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard                                                              │
//! │  ├── total products      COUNT(products)                                │
//! │  ├── total stock         Σ inventory_records.quantity_in_stock          │
//! │  ├── average stock       AVG per record, rounded                        │
//! │  ├── inventory value     Σ price_cents × quantity_in_stock              │
//! │  ├── low stock           records with quantity < threshold              │
//! │  ├── expiring soon       today ≤ expiry_date ≤ today + N days           │
//! │  └── recent orders       newest first                                   │
//! │                                                                         │
//! │  Alerts                  same queries, wider stock threshold            │
//! │  Suppliers               product counts, per-supplier inventory         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here writes. Calling any report twice without writes in between
//! returns the same rows in the same order.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use super::inventory::LISTING_SELECT;
use super::order::OrderRepository;
use super::product::PRODUCT_WITH_STOCK_SELECT;
use crate::config::AlertSection;
use crate::error::{DbError, DbResult};
use godown_core::validation::{validate_threshold, validate_window};
use godown_core::{
    DashboardSummary, ExpiringItem, InventoryListing, LowStockItem, Money, NamedQuantity,
    ProductWithStock, SupplierInventorySummary, SupplierProductCount, ValidationError,
    MAX_EXPIRY_WINDOW_DAYS, MAX_LOOKBACK_HOURS,
};

/// Everything the alerts page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    pub stock_threshold: i64,
    pub expiry_window_days: i64,
    pub low_stock: Vec<LowStockItem>,
    pub expiring: Vec<ExpiringItem>,
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    // =========================================================================
    // Headline Numbers
    // =========================================================================

    /// Σ quantity over every inventory record.
    pub async fn total_stock(&self) -> DbResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity_in_stock), 0) FROM inventory_records")
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    pub async fn product_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Mean quantity per inventory record, rounded; 0 with no records.
    pub async fn average_stock_level(&self) -> DbResult<i64> {
        let average: i64 = sqlx::query_scalar(
            "SELECT CAST(ROUND(COALESCE(AVG(quantity_in_stock), 0)) AS INTEGER) FROM inventory_records",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(average)
    }

    /// Σ unit price × quantity across all records.
    pub async fn total_inventory_value(&self) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(p.price_cents * ir.quantity_in_stock), 0)
            FROM inventory_records ir
            JOIN products p ON p.product_id = ir.product_id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    // =========================================================================
    // Alerts
    // =========================================================================

    /// Records with quantity strictly below `threshold`, lowest first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<LowStockItem>> {
        validate_threshold("threshold", threshold)?;
        debug!(threshold, "Querying low stock");

        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT
                ir.record_id,
                ir.product_id,
                p.product_name,
                p.category,
                s.supplier_name,
                w.warehouse_name,
                ir.quantity_in_stock,
                ir.expiry_date
            FROM inventory_records ir
            JOIN products p ON p.product_id = ir.product_id
            JOIN warehouses w ON w.warehouse_id = ir.warehouse_id
            LEFT JOIN suppliers s ON s.supplier_id = p.supplier_id
            WHERE ir.quantity_in_stock < ?1
            ORDER BY ir.quantity_in_stock, ir.record_id
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Records expiring between `today` and `today + days`, inclusive.
    /// Already expired stock is not included.
    pub async fn expiring(&self, today: NaiveDate, days: i64) -> DbResult<Vec<ExpiringItem>> {
        validate_window("days", days, MAX_EXPIRY_WINDOW_DAYS)?;
        let until = TimeDelta::try_days(days)
            .and_then(|window| today.checked_add_signed(window))
            .ok_or_else(|| window_out_of_range("days", MAX_EXPIRY_WINDOW_DAYS))?;
        debug!(%today, %until, "Querying expiring stock");

        let items = sqlx::query_as::<_, ExpiringItem>(
            r#"
            SELECT
                ir.record_id,
                ir.product_id,
                p.product_name,
                p.category,
                w.warehouse_name,
                ir.quantity_in_stock,
                ir.expiry_date,
                CAST(julianday(ir.expiry_date) - julianday(?1) AS INTEGER) AS days_remaining
            FROM inventory_records ir
            JOIN products p ON p.product_id = ir.product_id
            JOIN warehouses w ON w.warehouse_id = ir.warehouse_id
            WHERE ir.expiry_date IS NOT NULL
              AND ir.expiry_date >= ?1
              AND ir.expiry_date <= ?2
            ORDER BY ir.expiry_date, ir.record_id
            "#,
        )
        .bind(today)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Low stock and expiring stock with the alerts page thresholds.
    pub async fn alerts(&self, today: NaiveDate, settings: &AlertSection) -> DbResult<AlertReport> {
        Ok(AlertReport {
            stock_threshold: settings.alert_stock_threshold,
            expiry_window_days: settings.expiry_window_days,
            low_stock: self.low_stock(settings.alert_stock_threshold).await?,
            expiring: self.expiring(today, settings.expiry_window_days).await?,
        })
    }

    /// Products with at least one dated record, with their total stock.
    pub async fn perishable_products(&self) -> DbResult<Vec<ProductWithStock>> {
        let sql = format!(
            r#"
            {PRODUCT_WITH_STOCK_SELECT}
            WHERE EXISTS (
                SELECT 1 FROM inventory_records dated
                WHERE dated.product_id = p.product_id
                  AND dated.expiry_date IS NOT NULL
            )
            ORDER BY p.product_id
            "#
        );

        let products = sqlx::query_as::<_, ProductWithStock>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Records touched at or after `since`, most recent first.
    pub async fn updated_since(&self, since: DateTime<Utc>) -> DbResult<Vec<InventoryListing>> {
        let sql = format!(
            r#"
            {LISTING_SELECT}
            WHERE julianday(ir.last_updated) >= julianday(?1)
            ORDER BY julianday(ir.last_updated) DESC, ir.record_id
            "#
        );

        let records = sqlx::query_as::<_, InventoryListing>(&sql)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Records touched within the last `hours` hours.
    pub async fn recently_updated(&self, hours: i64) -> DbResult<Vec<InventoryListing>> {
        validate_window("hours", hours, MAX_LOOKBACK_HOURS)?;
        let since = TimeDelta::try_hours(hours)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| window_out_of_range("hours", MAX_LOOKBACK_HOURS))?;
        self.updated_since(since).await
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Every supplier with how many products name it as preferred supplier.
    pub async fn supplier_product_counts(&self) -> DbResult<Vec<SupplierProductCount>> {
        let counts = sqlx::query_as::<_, SupplierProductCount>(
            r#"
            SELECT
                s.supplier_id,
                s.supplier_name,
                COUNT(p.product_id) AS product_count
            FROM suppliers s
            LEFT JOIN products p ON p.supplier_id = s.supplier_id
            GROUP BY s.supplier_id, s.supplier_name
            ORDER BY product_count DESC, s.supplier_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Stock attributed to one supplier through its inventory records.
    pub async fn supplier_inventory_summary(
        &self,
        supplier_id: i64,
    ) -> DbResult<SupplierInventorySummary> {
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT supplier_id FROM suppliers WHERE supplier_id = ?1")
                .bind(supplier_id)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Supplier", supplier_id));
        }

        let (total_products, total_stock, total_value_cents): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(DISTINCT ir.product_id),
                COALESCE(SUM(ir.quantity_in_stock), 0),
                COALESCE(SUM(ir.quantity_in_stock * p.price_cents), 0)
            FROM inventory_records ir
            JOIN products p ON p.product_id = ir.product_id
            WHERE ir.supplier_id = ?1
            "#,
        )
        .bind(supplier_id)
        .fetch_one(&self.pool)
        .await?;

        let warehouses = sqlx::query_as::<_, NamedQuantity>(
            r#"
            SELECT w.warehouse_name AS name, SUM(ir.quantity_in_stock) AS quantity
            FROM inventory_records ir
            JOIN warehouses w ON w.warehouse_id = ir.warehouse_id
            WHERE ir.supplier_id = ?1
            GROUP BY w.warehouse_id, w.warehouse_name
            ORDER BY w.warehouse_name
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        let categories = sqlx::query_as::<_, NamedQuantity>(
            r#"
            SELECT COALESCE(p.category, 'Uncategorized') AS name,
                   SUM(ir.quantity_in_stock) AS quantity
            FROM inventory_records ir
            JOIN products p ON p.product_id = ir.product_id
            WHERE ir.supplier_id = ?1
            GROUP BY COALESCE(p.category, 'Uncategorized')
            ORDER BY name
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SupplierInventorySummary {
            supplier_id,
            total_products,
            total_stock,
            total_value_cents,
            warehouses,
            categories,
        })
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub async fn dashboard(
        &self,
        today: NaiveDate,
        settings: &AlertSection,
    ) -> DbResult<DashboardSummary> {
        let low_stock = self.low_stock(settings.low_stock_threshold).await?;
        let expiring = self.expiring(today, settings.expiry_window_days).await?;
        let recent_orders = OrderRepository::new(self.pool.clone())
            .recent(settings.recent_orders_limit)
            .await?;

        Ok(DashboardSummary {
            total_products: self.product_count().await?,
            total_stock: self.total_stock().await?,
            average_stock_level: self.average_stock_level().await?,
            total_inventory_value_cents: self.total_inventory_value().await?.cents(),
            low_stock_count: low_stock.len(),
            expiring_count: expiring.len(),
            recent_orders,
        })
    }
}

fn window_out_of_range(field: &str, max: i64) -> DbError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, Database, DbConfig};
    use godown_core::{CoreError, NewInventoryRecord};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    async fn seeded() -> Database {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        fixtures::seed_demo_data(&db, today()).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_headline_numbers() {
        let db = seeded().await;
        let reports = db.reports();

        assert_eq!(reports.product_count().await.unwrap(), 6);
        assert_eq!(reports.total_stock().await.unwrap(), 1500);
        assert_eq!(reports.average_stock_level().await.unwrap(), 250);
        assert_eq!(reports.total_inventory_value().await.unwrap().cents(), 1_166_000);
    }

    #[tokio::test]
    async fn test_empty_store_reports_zero() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let reports = db.reports();

        assert_eq!(reports.total_stock().await.unwrap(), 0);
        assert_eq!(reports.average_stock_level().await.unwrap(), 0);
        assert!(reports.total_inventory_value().await.unwrap().is_zero());
        assert!(reports.low_stock(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_is_strict_and_ordered() {
        let db = seeded().await;
        let reports = db.reports();

        // Chicken sits at exactly 100
        assert!(reports.low_stock(100).await.unwrap().is_empty());

        let alerts = reports.low_stock(200).await.unwrap();
        let quantities: Vec<i64> = alerts.iter().map(|i| i.quantity_in_stock).collect();
        assert_eq!(quantities, vec![100, 150]);
        assert_eq!(alerts[0].product_name, "Chicken");
        assert_eq!(alerts[0].supplier_name.as_deref(), Some("Fresh Foods Inc"));

        assert_eq!(reports.low_stock(200).await.unwrap(), alerts);
        assert!(reports.low_stock(-1).await.is_err());
    }

    #[tokio::test]
    async fn test_expiring_window() {
        let db = seeded().await;
        let expiring = db.reports().expiring(today(), 30).await.unwrap();

        let names: Vec<&str> = expiring.iter().map(|i| i.product_name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Chicken", "Tomatoes"]);
        assert_eq!(expiring[0].days_remaining, 8);

        // A week later Milk is one day from expiry, not yet gone
        let later = today() + TimeDelta::days(7);
        let expiring = db.reports().expiring(later, 30).await.unwrap();
        assert_eq!(expiring[0].product_name, "Milk");
        assert_eq!(expiring[0].days_remaining, 1);

        // Past its date it drops out
        let after = today() + TimeDelta::days(9);
        let expiring = db.reports().expiring(after, 30).await.unwrap();
        assert!(expiring.iter().all(|i| i.product_name != "Milk"));
    }

    #[tokio::test]
    async fn test_perishable_products() {
        let db = seeded().await;
        db.inventory()
            .insert(&NewInventoryRecord {
                product_id: 1,
                warehouse_id: 2,
                quantity_in_stock: 20,
                expiry_date: None,
                supplier_id: None,
            })
            .await
            .unwrap();

        let perishable = db.reports().perishable_products().await.unwrap();
        assert_eq!(perishable.len(), 6);
        assert_eq!(perishable[0].total_stock, 520);
    }

    #[tokio::test]
    async fn test_updated_since() {
        let db = seeded().await;
        let reports = db.reports();

        assert_eq!(reports.recently_updated(24).await.unwrap().len(), 6);

        let future = Utc::now() + TimeDelta::hours(1);
        assert!(reports.updated_since(future).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_huge_windows_are_rejected() {
        let db = seeded().await;
        let reports = db.reports();

        let err = reports.expiring(today(), 200_000_000).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(reports.expiring(today(), MAX_EXPIRY_WINDOW_DAYS).await.is_ok());

        // Near the end of the calendar even an allowed window cannot be added
        let last_day = NaiveDate::MAX - TimeDelta::days(1);
        assert!(reports.expiring(last_day, 30).await.is_err());

        let err = reports.recently_updated(i64::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(
            reports.recently_updated(MAX_LOOKBACK_HOURS).await.unwrap().len(),
            6
        );
    }

    #[tokio::test]
    async fn test_supplier_reports() {
        let db = seeded().await;
        let reports = db.reports();

        let counts = reports.supplier_product_counts().await.unwrap();
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|c| c.product_count == 2));

        let grains = reports.supplier_inventory_summary(3).await.unwrap();
        assert_eq!(grains.total_products, 2);
        assert_eq!(grains.total_stock, 800);
        assert_eq!(grains.total_value_cents, 829_200);
        assert_eq!(
            grains.warehouses,
            vec![NamedQuantity { name: "Central Warehouse".to_string(), quantity: 800 }]
        );
        assert_eq!(
            grains.categories,
            vec![
                NamedQuantity { name: "Baking".to_string(), quantity: 300 },
                NamedQuantity { name: "Grains".to_string(), quantity: 500 },
            ]
        );

        assert!(matches!(
            reports.supplier_inventory_summary(9).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_dashboard_and_alerts() {
        let db = seeded().await;
        let settings = AlertSection::default();

        let dashboard = db.reports().dashboard(today(), &settings).await.unwrap();
        assert_eq!(dashboard.total_products, 6);
        assert_eq!(dashboard.total_stock, 1500);
        assert_eq!(dashboard.low_stock_count, 0);
        assert_eq!(dashboard.expiring_count, 3);
        assert_eq!(dashboard.recent_orders.len(), 3);
        assert_eq!(dashboard.recent_orders[0].order_id, 3);

        let alerts = db.reports().alerts(today(), &settings).await.unwrap();
        assert_eq!(alerts.low_stock.len(), 1);
        assert_eq!(alerts.low_stock[0].product_name, "Chicken");
        assert_eq!(alerts.expiring.len(), 3);
    }
}
