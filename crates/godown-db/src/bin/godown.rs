//! # godown
//!
//! Command-line front end for the Godown store.
//!
//! ## Usage
//! ```bash
//! # Dashboard numbers for the demo data set
//! cargo run -p godown-db --bin godown -- report
//!
//! # Low stock and expiring stock
//! cargo run -p godown-db --bin godown -- alerts
//!
//! # Place an order: customer 1, 5 × product 1, 3 × product 5
//! cargo run -p godown-db --bin godown -- order --customer 1 --line 1:5 --line 5:3
//!
//! # Snapshots
//! cargo run -p godown-db --bin godown -- export ./godown-backup.sqlite
//! cargo run -p godown-db --bin godown -- import ./godown-backup.sqlite
//!
//! # Use a file-backed store instead of memory
//! cargo run -p godown-db --bin godown -- --db ./godown.db report
//! ```
//!
//! Every command prints JSON on stdout. Logs go to stderr and follow
//! `RUST_LOG` (default `info,godown=debug,sqlx=warn`).

use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use godown_core::{OrderLine, OrderRequest};
use godown_db::{Database, StoreSettings};

#[derive(Parser)]
#[command(name = "godown", about = "Inventory store reports, orders and snapshots", version)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// File-backed store; overrides the settings file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dashboard summary
    Report,
    /// Low-stock and expiring inventory
    Alerts,
    /// Place an order
    Order {
        #[arg(long)]
        customer: i64,
        /// PRODUCT_ID:QUANTITY, repeatable
        #[arg(long = "line", value_parser = parse_line, required = true)]
        lines: Vec<OrderLine>,
        #[arg(long)]
        ship_to: Option<String>,
    },
    /// Delete a supplier, detaching its products and inventory records
    DeleteSupplier { id: i64 },
    /// Write the whole store to a SQLite file
    Export { file: PathBuf },
    /// Replace the store with a snapshot file, then print the dashboard
    Import { file: PathBuf },
}

fn parse_line(raw: &str) -> Result<OrderLine, String> {
    let (product, quantity) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected PRODUCT_ID:QUANTITY, got '{raw}'"))?;
    let product_id = product
        .trim()
        .parse()
        .map_err(|_| format!("invalid product id '{product}'"))?;
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity '{quantity}'"))?;
    Ok(OrderLine { product_id, quantity })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,godown=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = StoreSettings::load_or_default(cli.config);
    if let Some(path) = cli.db {
        settings.store.database_path = Some(path);
    }

    let db = Database::open(settings.db_config()).await?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Report => {
            print_json(&db.reports().dashboard(today, &settings.alerts).await?)?;
        }
        Commands::Alerts => {
            print_json(&db.reports().alerts(today, &settings.alerts).await?)?;
        }
        Commands::Order {
            customer,
            lines,
            ship_to,
        } => {
            let placed = db
                .orders()
                .place_order(&OrderRequest {
                    customer_id: customer,
                    shipping_address: ship_to,
                    lines,
                })
                .await?;
            print_json(&placed)?;
        }
        Commands::DeleteSupplier { id } => {
            print_json(&db.suppliers().delete_cascade(id).await?)?;
        }
        Commands::Export { file } => {
            db.export_to(&file).await?;
            info!(path = %file.display(), "Snapshot written");
        }
        Commands::Import { file } => {
            db.import_from(&file).await?;
            print_json(&db.reports().dashboard(today, &settings.alerts).await?)?;
        }
    }

    db.close().await;
    Ok(())
}
