//! # Customer Repository
//!
//! Database operations for customers.

use sqlx::SqlitePool;
use tracing::debug;

use super::like_pattern;
use crate::error::{DbError, DbResult};
use godown_core::validation::validate_new_customer;
use godown_core::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str = "customer_id, first_name, last_name, name, phone_number, \
     email, shipping_address, date_of_birth";

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY customer_id");
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Matches first name, last name, display name or e-mail.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list().await;
        }

        debug!(query = %query, "Searching customers");

        let sql = format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE first_name LIKE ?1 ESCAPE '\'
               OR last_name LIKE ?1 ESCAPE '\'
               OR name LIKE ?1 ESCAPE '\'
               OR email LIKE ?1 ESCAPE '\'
            ORDER BY last_name, first_name, customer_id
            "#
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(like_pattern(query))
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    pub async fn insert(&self, input: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(input)?;
        debug!(first_name = %input.first_name, last_name = %input.last_name, "Inserting customer");

        let sql = format!(
            r#"
            INSERT INTO customers (
                first_name, last_name, name, phone_number,
                email, shipping_address, date_of_birth
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(&input.name)
            .bind(&input.phone_number)
            .bind(&input.email)
            .bind(&input.shipping_address)
            .bind(input.date_of_birth)
            .fetch_one(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn update(&self, id: i64, input: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(input)?;
        debug!(id, "Updating customer");

        let sql = format!(
            r#"
            UPDATE customers SET
                first_name = ?2,
                last_name = ?3,
                name = ?4,
                phone_number = ?5,
                email = ?6,
                shipping_address = ?7,
                date_of_birth = ?8
            WHERE customer_id = ?1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(&input.name)
            .bind(&input.phone_number)
            .bind(&input.email)
            .bind(&input.shipping_address)
            .bind(input.date_of_birth)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }
}
