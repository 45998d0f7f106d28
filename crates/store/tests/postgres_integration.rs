//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{FlowId, SessionId, TransactionId};
use sqlx::PgPool;
use store::{
    NewOrder, NewProduct, NewTransaction, OrderStore, PostgresStore, ProductChanges, ProductStore,
    TransactionStore,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!("../../../migrations/001_create_tables.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE transactions, products, orders")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn new_transaction(txn: &str, session: &str, flow: &str) -> NewTransaction {
    NewTransaction {
        transaction_id: TransactionId::new(txn),
        session_id: SessionId::new(session),
        flow_id: FlowId::new(flow),
        status: "INITIATED".to_string(),
    }
}

fn new_product(seller: &str, stock: i64) -> NewProduct {
    NewProduct {
        name: "Basmati Rice".to_string(),
        description: Some("25kg bag".to_string()),
        price: 80.0,
        category: "grains".to_string(),
        stock_quantity: stock,
        image_url: None,
        seller_id: seller.to_string(),
    }
}

#[tokio::test]
async fn insert_and_lookup_transaction() {
    let store = get_test_store().await;

    store
        .insert_transaction(new_transaction("txn-1", "sess-1", "flow-a"))
        .await
        .unwrap();

    let by_id = store
        .transaction_by_id(&TransactionId::new("txn-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.session_id, SessionId::new("sess-1"));
    assert_eq!(by_id.status, "INITIATED");

    let by_session = store
        .transaction_by_session(&SessionId::new("sess-1"), &FlowId::new("flow-a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_session.transaction_id, TransactionId::new("txn-1"));
}

#[tokio::test]
async fn session_flow_pair_is_unique() {
    let store = get_test_store().await;

    store
        .insert_transaction(new_transaction("txn-1", "sess-1", "flow-a"))
        .await
        .unwrap();

    let duplicate = store
        .insert_transaction(new_transaction("txn-2", "sess-1", "flow-a"))
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn update_transaction_status_persists() {
    let store = get_test_store().await;
    let id = TransactionId::new("txn-1");

    store
        .insert_transaction(new_transaction("txn-1", "sess-1", "flow-a"))
        .await
        .unwrap();
    store.update_transaction_status(&id, "CONFIRMED").await.unwrap();

    let row = store.transaction_by_id(&id).await.unwrap().unwrap();
    assert_eq!(row.status, "CONFIRMED");
}

#[tokio::test]
async fn conditional_decrement_applies_once() {
    let store = get_test_store().await;
    let product = store.insert_product(new_product("seller-1", 5)).await.unwrap();

    let applied = store.decrement_stock(&product.id, 2, 5).await.unwrap();
    assert!(applied);
    assert_eq!(store.stock_quantity(&product.id).await.unwrap(), Some(3));

    // Same expected value again: the row moved on, so the write must not land.
    let stale = store.decrement_stock(&product.id, 2, 5).await.unwrap();
    assert!(!stale);
    assert_eq!(store.stock_quantity(&product.id).await.unwrap(), Some(3));
}

#[tokio::test]
async fn ownership_guard_blocks_foreign_writes() {
    let store = get_test_store().await;
    let product = store.insert_product(new_product("seller-1", 5)).await.unwrap();

    let changes = ProductChanges {
        price: Some(99.0),
        ..Default::default()
    };
    let denied = store
        .update_product(&product.id, "seller-2", changes)
        .await
        .unwrap();
    assert!(denied.is_none());

    let deleted = store.delete_product(&product.id, "seller-2").await.unwrap();
    assert!(!deleted);
    assert_eq!(store.stock_quantity(&product.id).await.unwrap(), Some(5));
}

#[tokio::test]
async fn search_matches_name_and_category() {
    let store = get_test_store().await;
    store.insert_product(new_product("seller-1", 5)).await.unwrap();

    let by_name = store.search_products("basmati").await.unwrap();
    assert_eq!(by_name.len(), 1);

    let by_category = store.search_products("GRAIN").await.unwrap();
    assert_eq!(by_category.len(), 1);

    let miss = store.search_products("mango").await.unwrap();
    assert!(miss.is_empty());
}

#[tokio::test]
async fn order_roundtrip_and_status_update() {
    let store = get_test_store().await;

    let order = store
        .insert_order(NewOrder {
            customer_name: "Buyer".to_string(),
            buyer_id: "buyer-1".to_string(),
            seller_id: "seller-1".to_string(),
            items: serde_json::json!([{"id": "p1", "quantity": 2}]),
            total_amount: 160.0,
            status: "PENDING".to_string(),
        })
        .await
        .unwrap();

    let for_seller = store.orders_by_seller("seller-1").await.unwrap();
    assert_eq!(for_seller.len(), 1);
    assert_eq!(for_seller[0].items, serde_json::json!([{"id": "p1", "quantity": 2}]));

    let updated = store
        .update_order_status(&order.id, "SHIPPED")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "SHIPPED");

    let for_buyer = store.orders_by_buyer("buyer-1").await.unwrap();
    assert_eq!(for_buyer[0].status, "SHIPPED");
}
