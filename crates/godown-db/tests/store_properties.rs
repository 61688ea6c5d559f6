//! End-to-end checks of the store's guarantees against the demo data set.

use chrono::NaiveDate;
use godown_core::{NewInventoryRecord, OrderLine, OrderRequest, OrderStatus};
use godown_db::{seed_demo_data, Database, DbConfig, DbError};

const RICE: i64 = 1;
const CHICKEN: i64 = 5;
const GLOBAL_GRAINS: i64 = 3;

async fn seeded() -> Database {
    let db = Database::open(DbConfig::in_memory()).await.unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    seed_demo_data(&db, today).await.unwrap();
    db
}

fn order(customer_id: i64, lines: &[(i64, i64)]) -> OrderRequest {
    OrderRequest {
        customer_id,
        shipping_address: None,
        lines: lines
            .iter()
            .map(|&(product_id, quantity)| OrderLine { product_id, quantity })
            .collect(),
    }
}

async fn quantities(db: &Database, product_id: i64) -> Vec<i64> {
    db.inventory()
        .list_by_product(product_id)
        .await
        .unwrap()
        .iter()
        .map(|r| r.quantity_in_stock)
        .collect()
}

#[tokio::test]
async fn deduction_conserves_stock_across_records() {
    let db = seeded().await;
    db.inventory()
        .insert(&NewInventoryRecord {
            product_id: RICE,
            warehouse_id: 2,
            quantity_in_stock: 40,
            expiry_date: None,
            supplier_id: Some(GLOBAL_GRAINS),
        })
        .await
        .unwrap();

    let before = db.inventory().total_stock(RICE).await.unwrap();
    assert_eq!(before, 540);

    let deduction = db.inventory().deduct_stock(RICE, 520).await.unwrap();
    assert_eq!(deduction.shortfall, 0);

    assert_eq!(db.inventory().total_stock(RICE).await.unwrap(), before - 520);
    assert_eq!(quantities(&db, RICE).await, vec![0, 20]);
}

#[tokio::test]
async fn deduction_never_goes_negative() {
    let db = seeded().await;

    let deduction = db.inventory().deduct_stock(CHICKEN, 10_000).await.unwrap();
    assert_eq!(deduction.shortfall, 9_900);

    for record in db.inventory().list().await.unwrap() {
        assert!(record.quantity_in_stock >= 0, "record {}", record.record_id);
    }
    assert_eq!(db.inventory().total_stock(CHICKEN).await.unwrap(), 0);
}

#[tokio::test]
async fn order_with_one_short_line_changes_nothing() {
    let db = seeded().await;
    let orders_before = db.orders().count().await.unwrap();
    let rice_before = quantities(&db, RICE).await;
    let chicken_before = quantities(&db, CHICKEN).await;

    let err = db
        .orders()
        .place_order(&order(1, &[(RICE, 5), (CHICKEN, 10_000)]))
        .await
        .unwrap_err();

    assert!(err.is_insufficient_stock());
    assert!(err.to_string().contains("Chicken"));
    assert_eq!(db.orders().count().await.unwrap(), orders_before);
    assert_eq!(quantities(&db, RICE).await, rice_before);
    assert_eq!(quantities(&db, CHICKEN).await, chicken_before);
}

#[tokio::test]
async fn deleting_a_supplier_detaches_its_products() {
    let db = seeded().await;
    let owned = db.products().list_by_supplier(GLOBAL_GRAINS).await.unwrap();
    assert_eq!(owned.len(), 2);

    let deletion = db.suppliers().delete_cascade(GLOBAL_GRAINS).await.unwrap();
    assert_eq!(deletion.products_detached, 2);

    for product in owned {
        let after = db.products().get_by_id(product.product_id).await.unwrap().unwrap();
        assert_eq!(after.supplier_id, None);
    }
    assert!(db
        .suppliers()
        .list()
        .await
        .unwrap()
        .iter()
        .all(|s| s.supplier_id != GLOBAL_GRAINS));
    assert!(db.inventory().list_by_supplier(GLOBAL_GRAINS).await.unwrap().is_empty());
    assert_eq!(db.products().count().await.unwrap(), 6);
}

#[tokio::test]
async fn low_stock_query_is_repeatable() {
    let db = seeded().await;

    let first = db.reports().low_stock(150).await.unwrap();
    let second = db.reports().low_stock(150).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[tokio::test]
async fn order_total_is_sum_of_line_totals() {
    let db = seeded().await;

    let placed = db
        .orders()
        .place_order(&order(2, &[(RICE, 5), (CHICKEN, 3)]))
        .await
        .unwrap();

    assert_eq!(placed.order.total_amount_cents, 9_192);
    assert_eq!(placed.order.total_amount().to_string(), "$91.92");
    for item in &placed.items {
        assert_eq!(item.total_price_cents, item.quantity_ordered * item.item_price_cents);
    }

    let stored = db.orders().get_details(placed.order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.order.order_status, OrderStatus::Pending);
    assert_eq!(stored.items.len(), 2);
}

#[tokio::test]
async fn closed_store_rejects_operations() {
    let db = seeded().await;
    db.close().await;

    let err = db.products().list().await.unwrap_err();
    assert!(matches!(err, DbError::StoreClosed));
    assert_eq!(err.to_string(), "Store is not initialized");
}

#[tokio::test]
async fn snapshot_survives_a_round_trip_through_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("godown.db");

    let memory = seeded().await;
    memory
        .orders()
        .place_order(&order(3, &[(CHICKEN, 10)]))
        .await
        .unwrap();
    let bytes = memory.export_snapshot().await.unwrap();

    let file = Database::open(DbConfig::new(&path)).await.unwrap();
    file.import_snapshot(&bytes).await.unwrap();
    file.close().await;

    let reopened = Database::open(DbConfig::new(&path)).await.unwrap();
    assert_eq!(reopened.orders().count().await.unwrap(), 4);
    assert_eq!(reopened.inventory().total_stock(CHICKEN).await.unwrap(), 90);
}
