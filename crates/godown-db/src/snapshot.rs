//! # Snapshot Export / Import
//!
//! The whole store as one SQLite database file.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EXPORT                                                                 │
//! │  VACUUM INTO <scratch> ──► read bytes ──► delete scratch                │
//! │                                                                         │
//! │  IMPORT                                                                 │
//! │  check "SQLite format 3" header                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write scratch ──► ATTACH AS snapshot ──► every store table present?    │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                        BEGIN                                            │
//! │                        DELETE children first (order_items .. suppliers) │
//! │                        INSERT parents first (suppliers .. order_items)  │
//! │                        COMMIT                                           │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                        DETACH ──► delete scratch                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected snapshot leaves the live store exactly as it was.

use sqlx::{Connection, SqliteConnection};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Store tables with the columns a snapshot carries, parents before children.
///
/// Rows are copied by column name, so a snapshot whose tables declare the
/// same columns in another order still lands in the right place.
pub const STORE_TABLES: &[(&str, &str)] = &[
    (
        "suppliers",
        "supplier_id, supplier_name, first_name, last_name, contact_phone, email, \
         address, city, state, locality, country",
    ),
    (
        "warehouses",
        "warehouse_id, warehouse_name, location, contact_number",
    ),
    (
        "products",
        "product_id, product_name, description, price_cents, category, supplier_id",
    ),
    (
        "inventory_records",
        "record_id, product_id, warehouse_id, quantity_in_stock, last_updated, expiry_date, \
         supplier_id",
    ),
    (
        "customers",
        "customer_id, first_name, last_name, name, phone_number, email, shipping_address, \
         date_of_birth",
    ),
    (
        "orders",
        "order_id, customer_id, order_date, total_amount_cents, shipping_address, order_status",
    ),
    (
        "order_items",
        "order_item_id, order_id, product_id, quantity_ordered, item_price_cents, \
         total_price_cents",
    ),
];

const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

impl Database {
    /// Serializes the whole store to the bytes of a SQLite database file.
    pub async fn export_snapshot(&self) -> DbResult<Vec<u8>> {
        let scratch = scratch_path();
        debug!(path = %scratch.display(), "Vacuuming store into scratch file");

        sqlx::query("VACUUM INTO ?1")
            .bind(scratch.to_string_lossy().into_owned())
            .execute(self.pool())
            .await?;

        let bytes = tokio::fs::read(&scratch).await;
        remove_scratch(&scratch).await;
        let bytes = bytes?;

        info!(bytes = bytes.len(), "Snapshot exported");
        Ok(bytes)
    }

    /// Writes a snapshot to `path`, replacing any existing file.
    pub async fn export_to(&self, path: impl AsRef<Path>) -> DbResult<()> {
        let bytes = self.export_snapshot().await?;
        tokio::fs::write(path.as_ref(), &bytes).await?;
        Ok(())
    }

    /// Replaces every row of the store with the contents of a snapshot.
    pub async fn import_snapshot(&self, bytes: &[u8]) -> DbResult<()> {
        if !bytes.starts_with(SQLITE_HEADER) {
            return Err(DbError::InvalidSnapshot(
                "not a SQLite database file".to_string(),
            ));
        }

        let scratch = scratch_path();
        tokio::fs::write(&scratch, bytes).await?;

        let result = self.replace_from_file(&scratch).await;
        remove_scratch(&scratch).await;
        result
    }

    /// Reads a snapshot file and imports it.
    pub async fn import_from(&self, path: impl AsRef<Path>) -> DbResult<()> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        self.import_snapshot(&bytes).await
    }

    async fn replace_from_file(&self, file: &Path) -> DbResult<()> {
        // ATTACH is not allowed inside a transaction, so take the connection first
        let mut conn = self.pool().acquire().await?;

        sqlx::query("ATTACH DATABASE ?1 AS snapshot")
            .bind(file.to_string_lossy().into_owned())
            .execute(&mut *conn)
            .await
            .map_err(snapshot_error)?;

        let result = copy_attached(&mut *conn).await;

        if let Err(e) = sqlx::query("DETACH DATABASE snapshot").execute(&mut *conn).await {
            warn!(error = %e, "Failed to detach snapshot");
        }

        let rows = result?;
        info!(rows, "Snapshot imported");
        Ok(())
    }
}

/// Copies every store table from the attached `snapshot` schema into `main`.
async fn copy_attached(conn: &mut SqliteConnection) -> DbResult<u64> {
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM snapshot.sqlite_master WHERE type = 'table'",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(snapshot_error)?;

    if let Some((missing, _)) = STORE_TABLES
        .iter()
        .find(|(table, _)| !present.iter().any(|name| name == *table))
    {
        return Err(DbError::InvalidSnapshot(format!("missing table {missing}")));
    }

    let mut tx = conn.begin().await?;
    match replace_rows(&mut *tx).await {
        Ok(rows) => {
            tx.commit().await?;
            Ok(rows)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

async fn replace_rows(conn: &mut SqliteConnection) -> DbResult<u64> {
    for (table, _) in STORE_TABLES.iter().rev() {
        sqlx::query(&format!("DELETE FROM main.{table}"))
            .execute(&mut *conn)
            .await?;
    }

    let mut rows = 0;
    for (table, columns) in STORE_TABLES {
        let copied = sqlx::query(&format!(
            "INSERT INTO main.{table} ({columns}) SELECT {columns} FROM snapshot.{table}"
        ))
        .execute(&mut *conn)
        .await
        .map_err(snapshot_error)?;

        debug!(table, rows = copied.rows_affected(), "Copied snapshot table");
        rows += copied.rows_affected();
    }

    Ok(rows)
}

fn snapshot_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::PoolClosed => DbError::StoreClosed,
        other => DbError::InvalidSnapshot(other.to_string()),
    }
}

fn scratch_path() -> PathBuf {
    std::env::temp_dir().join(format!("godown-{}.sqlite", Uuid::new_v4()))
}

async fn remove_scratch(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
    }
}
