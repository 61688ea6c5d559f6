//! # Warehouse Repository
//!
//! Database operations for warehouses.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use godown_core::validation::validate_new_warehouse;
use godown_core::{NewWarehouse, Warehouse};

/// Repository for warehouse database operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT warehouse_id, warehouse_name, location, contact_number
            FROM warehouses
            ORDER BY warehouse_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(warehouses)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT warehouse_id, warehouse_name, location, contact_number
            FROM warehouses
            WHERE warehouse_id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(warehouse)
    }

    pub async fn insert(&self, input: &NewWarehouse) -> DbResult<Warehouse> {
        validate_new_warehouse(input)?;
        debug!(name = %input.warehouse_name, "Inserting warehouse");

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (warehouse_name, location, contact_number)
            VALUES (?1, ?2, ?3)
            RETURNING warehouse_id, warehouse_name, location, contact_number
            "#,
        )
        .bind(input.warehouse_name.trim())
        .bind(&input.location)
        .bind(&input.contact_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(warehouse)
    }

    pub async fn update(&self, id: i64, input: &NewWarehouse) -> DbResult<Warehouse> {
        validate_new_warehouse(input)?;
        debug!(id, "Updating warehouse");

        sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses SET
                warehouse_name = ?2,
                location = ?3,
                contact_number = ?4
            WHERE warehouse_id = ?1
            RETURNING warehouse_id, warehouse_name, location, contact_number
            "#,
        )
        .bind(id)
        .bind(input.warehouse_name.trim())
        .bind(&input.location)
        .bind(&input.contact_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Warehouse", id))
    }
}
