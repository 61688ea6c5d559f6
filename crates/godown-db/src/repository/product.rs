//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Derived Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products has no stock column. Listing rows compute it:                 │
//! │                                                                         │
//! │  Rice ──► inventory_records: Central 500 ─┐                             │
//! │                              North    40 ─┼─► total_stock = 540         │
//! │                              (none)      ─┘                             │
//! │                                                                         │
//! │  A product with no records reports 0, never NULL.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use super::like_pattern;
use crate::error::{DbError, DbResult};
use godown_core::validation::validate_new_product;
use godown_core::{NewProduct, Product, ProductWithStock};

const PRODUCT_COLUMNS: &str =
    "product_id, product_name, description, price_cents, category, supplier_id";

/// Product + supplier name + derived total stock.
pub(crate) const PRODUCT_WITH_STOCK_SELECT: &str = r#"
    SELECT
        p.product_id,
        p.product_name,
        p.description,
        p.price_cents,
        p.category,
        p.supplier_id,
        s.supplier_name,
        COALESCE(
            (SELECT SUM(ir.quantity_in_stock)
             FROM inventory_records ir
             WHERE ir.product_id = p.product_id),
            0
        ) AS total_stock
    FROM products p
    LEFT JOIN suppliers s ON s.supplier_id = p.supplier_id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let listing = repo.list().await?;
/// let rice = repo.get_with_stock(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product with its supplier name and total stock.
    pub async fn list(&self) -> DbResult<Vec<ProductWithStock>> {
        let sql = format!("{PRODUCT_WITH_STOCK_SELECT} ORDER BY p.product_id");
        let products = sqlx::query_as::<_, ProductWithStock>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product with supplier name and total stock.
    pub async fn get_with_stock(&self, id: i64) -> DbResult<Option<ProductWithStock>> {
        let sql = format!("{PRODUCT_WITH_STOCK_SELECT} WHERE p.product_id = ?1");
        let product = sqlx::query_as::<_, ProductWithStock>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Searches products by name or category substring (case-insensitive).
    ///
    /// An empty query returns the full listing.
    pub async fn search(&self, query: &str) -> DbResult<Vec<ProductWithStock>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list().await;
        }

        debug!(query = %query, "Searching products");

        let sql = format!(
            r#"
            {PRODUCT_WITH_STOCK_SELECT}
            WHERE p.product_name LIKE ?1 ESCAPE '\'
               OR p.category LIKE ?1 ESCAPE '\'
            ORDER BY p.product_name, p.product_id
            "#
        );

        let products = sqlx::query_as::<_, ProductWithStock>(&sql)
            .bind(like_pattern(query))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists the products whose preferred supplier is `supplier_id`.
    pub async fn list_by_supplier(&self, supplier_id: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE supplier_id = ?1 ORDER BY product_id"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its generated id
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown supplier
    pub async fn insert(&self, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;
        debug!(name = %input.product_name, "Inserting product");

        let sql = format!(
            r#"
            INSERT INTO products (product_name, description, price_cents, category, supplier_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(input.product_name.trim())
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(&input.category)
            .bind(input.supplier_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(product)
    }

    /// Updates an existing product.
    ///
    /// Existing order items keep the price they were sold at.
    pub async fn update(&self, id: i64, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;
        debug!(id, "Updating product");

        let sql = format!(
            r#"
            UPDATE products SET
                product_name = ?2,
                description = ?3,
                price_cents = ?4,
                category = ?5,
                supplier_id = ?6
            WHERE product_id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(input.product_name.trim())
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(&input.category)
            .bind(input.supplier_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
