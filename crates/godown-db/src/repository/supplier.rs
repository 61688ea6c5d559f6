//! # Supplier Repository
//!
//! Database operations for suppliers.
//!
//! ## Cascade Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete_cascade(3)                     (one transaction)                │
//! │                                                                         │
//! │  1. UPDATE products          SET supplier_id = NULL WHERE supplier_id=3 │
//! │  2. UPDATE inventory_records SET supplier_id = NULL WHERE supplier_id=3 │
//! │  3. DELETE FROM suppliers WHERE supplier_id = 3                         │
//! │       │                                                                 │
//! │       ├── 0 rows? ──► ROLLBACK, NotFound (nothing changed)              │
//! │       └── 1 row   ──► COMMIT                                            │
//! │                                                                         │
//! │  Products and stock survive; they just lose their supplier.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use godown_core::validation::validate_new_supplier;
use godown_core::{NewSupplier, Supplier, SupplierDeletion};

const SUPPLIER_COLUMNS: &str = "supplier_id, supplier_name, first_name, last_name, \
     contact_phone, email, address, city, state, locality, country";

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists all suppliers by id.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY supplier_id");
        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(suppliers)
    }

    /// Gets a supplier by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE supplier_id = ?1");
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// Inserts a new supplier.
    pub async fn insert(&self, input: &NewSupplier) -> DbResult<Supplier> {
        validate_new_supplier(input)?;
        debug!(name = %input.supplier_name, "Inserting supplier");

        let sql = format!(
            r#"
            INSERT INTO suppliers (
                supplier_name, first_name, last_name, contact_phone, email,
                address, city, state, locality, country
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );

        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(input.supplier_name.trim())
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.contact_phone)
            .bind(&input.email)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.locality)
            .bind(&input.country)
            .fetch_one(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// Updates an existing supplier.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Supplier doesn't exist
    pub async fn update(&self, id: i64, input: &NewSupplier) -> DbResult<Supplier> {
        validate_new_supplier(input)?;
        debug!(id, "Updating supplier");

        let sql = format!(
            r#"
            UPDATE suppliers SET
                supplier_name = ?2,
                first_name = ?3,
                last_name = ?4,
                contact_phone = ?5,
                email = ?6,
                address = ?7,
                city = ?8,
                state = ?9,
                locality = ?10,
                country = ?11
            WHERE supplier_id = ?1
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .bind(input.supplier_name.trim())
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.contact_phone)
            .bind(&input.email)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.locality)
            .bind(&input.country)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Deletes a supplier, detaching its products and inventory records.
    ///
    /// All three statements run in one transaction: either the supplier is
    /// gone and nothing references it, or nothing changed.
    pub async fn delete_cascade(&self, id: i64) -> DbResult<SupplierDeletion> {
        debug!(id, "Deleting supplier with cascade");

        let mut tx = self.pool.begin().await?;

        let products = sqlx::query("UPDATE products SET supplier_id = NULL WHERE supplier_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let records = sqlx::query(
            "UPDATE inventory_records SET supplier_id = NULL WHERE supplier_id = ?1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM suppliers WHERE supplier_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Supplier", id));
        }

        tx.commit().await?;

        let deletion = SupplierDeletion {
            supplier_id: id,
            products_detached: products.rows_affected(),
            records_detached: records.rows_affected(),
        };

        info!(
            supplier_id = id,
            products = deletion.products_detached,
            records = deletion.records_detached,
            "Supplier deleted"
        );

        Ok(deletion)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
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

    async fn seeded() -> Database {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        fixtures::seed_demo_data(&db, today).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_update() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        let created = repo
            .insert(&NewSupplier {
                supplier_name: "Harbor Seafood".to_string(),
                email: Some("orders@harbor.example".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.supplier_name, "Harbor Seafood");

        let updated = repo
            .update(
                created.supplier_id,
                &NewSupplier {
                    supplier_name: "Harbor Seafood Co".to_string(),
                    city: Some("Boston".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.supplier_name, "Harbor Seafood Co");
        assert_eq!(updated.city.as_deref(), Some("Boston"));
        assert_eq!(updated.email, None);
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_name() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let err = db.suppliers().insert(&NewSupplier::default()).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
        assert_eq!(db.suppliers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let input = NewSupplier {
            supplier_name: "Nobody".to_string(),
            ..Default::default()
        };
        let err = db.suppliers().update(99, &input).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascade_detaches_everything() {
        let db = seeded().await;

        // Global Grains supplies Rice and Wheat Flour
        let deletion = db.suppliers().delete_cascade(3).await.unwrap();
        assert_eq!(deletion.products_detached, 2);
        assert_eq!(deletion.records_detached, 2);

        assert!(db.suppliers().get_by_id(3).await.unwrap().is_none());
        assert_eq!(db.products().count().await.unwrap(), 6);
        assert!(db.products().list_by_supplier(3).await.unwrap().is_empty());
        assert!(db.inventory().list_by_supplier(3).await.unwrap().is_empty());

        let rice = db.products().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(rice.supplier_id, None);
        assert_eq!(db.inventory().total_stock(1).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_delete_unknown_supplier_changes_nothing() {
        let db = seeded().await;

        let err = db.suppliers().delete_cascade(42).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.suppliers().count().await.unwrap(), 3);
    }
}
