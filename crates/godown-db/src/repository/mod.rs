//! # Repository Module
//!
//! One repository per entity, plus reporting.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Front end action                                                       │
//! │       │                                                                 │
//! │       │  db.orders().place_order(&request)                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── validate input (godown-core::validation)                           │
//! │  ├── BEGIN                                                              │
//! │  ├── read rows ──► godown-core::stock decides ──► write rows            │
//! │  └── COMMIT (or ROLLBACK on any error)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (in-memory or file)                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository holds a clone of the pool. Repositories never call each
//! other inside a transaction: the in-memory store has a single connection,
//! so transactional helpers take `&mut SqliteConnection` instead.
//!
//! ## Available Repositories
//!
//! - [`SupplierRepository`] - Supplier CRUD and cascade delete
//! - [`WarehouseRepository`] - Warehouse CRUD
//! - [`ProductRepository`] - Product CRUD, stock-aware listing, search
//! - [`InventoryRepository`] - Inventory records, restock, deduction
//! - [`CustomerRepository`] - Customer CRUD and search
//! - [`OrderRepository`] - Order placement and status
//! - [`ReportRepository`] - Dashboard, alerts, supplier reports

pub mod customer;
pub mod inventory;
pub mod order;
pub mod product;
pub mod report;
pub mod supplier;
pub mod warehouse;

pub use customer::CustomerRepository;
pub use inventory::{InventoryRepository, StockDeduction};
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use report::{AlertReport, ReportRepository};
pub use supplier::SupplierRepository;
pub use warehouse::WarehouseRepository;

/// Builds a `LIKE` pattern matching `term` anywhere, with `%`, `_` and `\`
/// escaped. Use with `ESCAPE '\'`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
