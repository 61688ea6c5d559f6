//! # godown-db: Store Layer for Godown Inventory
//!
//! This crate owns the relational store behind the inventory front end.
//! It uses SQLite (in-memory by default) with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Godown Data Flow                                 │
//! │                                                                         │
//! │  Front end form / page (place order, restock, delete supplier)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     godown-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │ (repository/) │    │  (embedded)  │    │    │
//! │  │   │               │    │               │    │              │    │    │
//! │  │   │ open / close  │◄───│ OrderRepo     │    │ 001_initial  │    │    │
//! │  │   │ snapshots     │    │ SupplierRepo  │    │              │    │    │
//! │  │   │ demo fixtures │    │ ReportRepo .. │    │              │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │   SQLite: sqlite::memory: (demo) or a file (godown --db ...)    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decisions (is there enough stock, how a deduction spreads over records)
//! live in `godown-core`. This crate reads rows, asks core, and writes the
//! outcome inside a transaction.
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening and closing the store
//! - [`config`] - Store settings from TOML and environment
//! - [`migrations`] - Embedded schema migrations
//! - [`fixtures`] - Demonstration data set
//! - [`repository`] - One repository per entity, plus reports
//! - [`snapshot`] - Whole-store export and import
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use godown_db::{Database, DbConfig};
//! use godown_core::{OrderLine, OrderRequest};
//!
//! let db = Database::open(DbConfig::in_memory().seed_demo_data(true)).await?;
//!
//! let placed = db
//!     .orders()
//!     .place_order(&OrderRequest {
//!         customer_id: 1,
//!         shipping_address: None,
//!         lines: vec![OrderLine { product_id: 1, quantity: 5 }],
//!     })
//!     .await?;
//!
//! let backup = db.export_snapshot().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod fixtures;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AlertSection, StoreSection, StoreSettings};
pub use error::{DbError, DbResult};
pub use fixtures::{seed_demo_data, SeedSummary};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    AlertReport, CustomerRepository, InventoryRepository, OrderRepository, ProductRepository,
    ReportRepository, StockDeduction, SupplierRepository, WarehouseRepository,
};
