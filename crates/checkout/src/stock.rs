//! Stock reservation and rollback inside `confirm`.
//!
//! A saga-style compensating sequence, not an atomic transaction: items are
//! decremented one at a time with a conditional write, and a partway failure
//! restores whatever was already applied before the error surfaces.

use serde::{Deserialize, Serialize};
use store::{NewOrder, OrderRecord, OrderStore, ProductStore};

use crate::error::CheckoutError;

/// Fallback customer name when the confirm inputs omit one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Buyer";
/// Sentinel buyer id when the confirm inputs omit one.
pub const DEFAULT_BUYER_ID: &str = "buyer_default";
/// Sentinel seller id when the confirm inputs omit one.
pub const DEFAULT_SELLER_ID: &str = "unknown_seller";

/// Initial status for orders recorded after confirmation.
const ORDER_STATUS_PENDING: &str = "PENDING";

/// One ordered item in the confirm inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub quantity: i64,
}

/// Order-relevant fields extracted from the confirm step's inputs.
///
/// Clients attach varying field sets per app snapshot, so every field is
/// optional and unknown keys are ignored; missing values fall back to the
/// sentinels above.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmInputs {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub buyer_id: Option<String>,
}

impl ConfirmInputs {
    /// Extracts order fields from raw confirm inputs. Absent or malformed
    /// inputs yield the empty default, mirroring clients that confirm
    /// without an item list.
    pub fn parse(inputs: Option<&serde_json::Value>) -> Self {
        let Some(value) = inputs else {
            return Self::default();
        };
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "confirm inputs not order-shaped, using defaults");
                Self::default()
            }
        }
    }
}

/// Decrements stock for each item in caller order, then records the order.
///
/// The conditional write keyed on the previously read stock value is the
/// only safeguard against a concurrent decrement on the same product. The
/// first insufficient or conflicted item aborts the remainder and rolls
/// back every decrement already applied in this call; an order-insert
/// failure rolls back all of them.
pub(crate) async fn reserve_and_record<S>(
    store: &S,
    inputs: &ConfirmInputs,
) -> Result<OrderRecord, CheckoutError>
where
    S: ProductStore + OrderStore,
{
    let mut applied: Vec<LineItem> = Vec::new();

    for item in &inputs.items {
        let current = match store.stock_quantity(&item.id).await {
            Ok(stock) => stock.unwrap_or(0),
            Err(e) => {
                roll_back(store, &applied).await;
                return Err(e.into());
            }
        };

        if current < item.quantity {
            roll_back(store, &applied).await;
            return Err(CheckoutError::InsufficientStock {
                product_id: item.id.clone(),
                requested: item.quantity,
                available: current,
            });
        }

        match store.decrement_stock(&item.id, item.quantity, current).await {
            Ok(true) => applied.push(item.clone()),
            Ok(false) => {
                roll_back(store, &applied).await;
                return Err(CheckoutError::StockUpdateConflict {
                    product_id: item.id.clone(),
                });
            }
            Err(e) => {
                roll_back(store, &applied).await;
                return Err(e.into());
            }
        }
    }

    let order = NewOrder {
        customer_name: inputs
            .customer_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
        buyer_id: inputs
            .buyer_id
            .clone()
            .unwrap_or_else(|| DEFAULT_BUYER_ID.to_string()),
        seller_id: inputs
            .seller_id
            .clone()
            .unwrap_or_else(|| DEFAULT_SELLER_ID.to_string()),
        items: serde_json::to_value(&inputs.items)?,
        total_amount: inputs.total_amount.unwrap_or(0.0),
        status: ORDER_STATUS_PENDING.to_string(),
    };

    match store.insert_order(order).await {
        Ok(record) => Ok(record),
        Err(e) => {
            roll_back(store, &applied).await;
            Err(e.into())
        }
    }
}

/// Restores applied decrements in reverse order. Best-effort: a failed
/// restore leaves inventory under-counted and is only logged.
async fn roll_back<S: ProductStore>(store: &S, applied: &[LineItem]) {
    if applied.is_empty() {
        return;
    }
    metrics::counter!("stock_rollbacks_total").increment(1);
    tracing::warn!(items = applied.len(), "rolling back applied stock decrements");

    for item in applied.iter().rev() {
        match store.stock_quantity(&item.id).await {
            Ok(Some(current)) => {
                if let Err(e) = store.set_stock(&item.id, current + item.quantity).await {
                    tracing::warn!(product_id = %item.id, error = %e, "stock rollback write failed");
                }
            }
            Ok(None) => {
                tracing::warn!(product_id = %item.id, "stock rollback skipped, product gone");
            }
            Err(e) => {
                tracing::warn!(product_id = %item.id, error = %e, "stock rollback read failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use store::{InMemoryStore, ProductRecord};

    fn product(id: &str, seller_id: &str, stock: i64) -> ProductRecord {
        let now = Utc::now();
        ProductRecord {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: None,
            price: 10.0,
            category: "grains".to_string(),
            stock_quantity: stock,
            image_url: None,
            seller_id: seller_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn inputs(items: Vec<LineItem>) -> ConfirmInputs {
        ConfirmInputs {
            items,
            ..Default::default()
        }
    }

    fn line(id: &str, quantity: i64) -> LineItem {
        LineItem {
            id: id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn decrements_each_item_and_records_pending_order() {
        let store = InMemoryStore::new();
        store.seed_product(product("p1", "seller-1", 5)).await;
        store.seed_product(product("p2", "seller-1", 4)).await;

        let order = reserve_and_record(&store, &inputs(vec![line("p1", 2), line("p2", 1)]))
            .await
            .unwrap();

        assert_eq!(store.stock_of("p1").await, Some(3));
        assert_eq!(store.stock_of("p2").await, Some(3));
        assert_eq!(order.status, "PENDING");
        assert_eq!(
            order.items,
            serde_json::json!([
                {"id": "p1", "quantity": 2},
                {"id": "p2", "quantity": 1},
            ])
        );
    }

    #[tokio::test]
    async fn insufficient_stock_identifies_item_and_leaves_stock_untouched() {
        let store = InMemoryStore::new();
        store.seed_product(product("p1", "seller-1", 5)).await;

        let err = reserve_and_record(&store, &inputs(vec![line("p1", 10)]))
            .await
            .unwrap_err();

        match err {
            CheckoutError::InsufficientStock {
                product_id,
                requested,
                available,
            } => {
                assert_eq!(product_id, "p1");
                assert_eq!(requested, 10);
                assert_eq!(available, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(store.stock_of("p1").await, Some(5));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn missing_product_counts_as_insufficient() {
        let store = InMemoryStore::new();

        let err = reserve_and_record(&store, &inputs(vec![line("ghost", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { available: 0, .. }
        ));
    }

    #[tokio::test]
    async fn partway_failure_restores_earlier_decrements() {
        let store = InMemoryStore::new();
        store.seed_product(product("p1", "seller-1", 5)).await;
        store.seed_product(product("p2", "seller-1", 1)).await;

        let err = reserve_and_record(&store, &inputs(vec![line("p1", 2), line("p2", 3)]))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::InsufficientStock { .. }));
        assert_eq!(store.stock_of("p1").await, Some(5));
        assert_eq!(store.stock_of("p2").await, Some(1));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn lost_race_aborts_with_conflict() {
        let store = InMemoryStore::new();
        store.seed_product(product("p1", "seller-1", 5)).await;
        store.set_conflict_on_decrement(true).await;

        let err = reserve_and_record(&store, &inputs(vec![line("p1", 2)]))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::StockUpdateConflict { .. }));
        assert_eq!(store.stock_of("p1").await, Some(5));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn order_insert_failure_rolls_back_all_items() {
        let store = InMemoryStore::new();
        store.seed_product(product("p1", "seller-1", 5)).await;
        store.seed_product(product("p2", "seller-1", 4)).await;
        store.set_fail_order_inserts(true).await;

        let err = reserve_and_record(&store, &inputs(vec![line("p1", 2), line("p2", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Store(_)));
        assert_eq!(store.stock_of("p1").await, Some(5));
        assert_eq!(store.stock_of("p2").await, Some(4));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn missing_fields_fall_back_to_sentinels() {
        let store = InMemoryStore::new();

        let order = reserve_and_record(&store, &ConfirmInputs::default())
            .await
            .unwrap();

        assert_eq!(order.customer_name, DEFAULT_CUSTOMER_NAME);
        assert_eq!(order.buyer_id, DEFAULT_BUYER_ID);
        assert_eq!(order.seller_id, DEFAULT_SELLER_ID);
        assert_eq!(order.total_amount, 0.0);
        assert_eq!(order.items, serde_json::json!([]));
    }

    #[test]
    fn parse_tolerates_missing_and_malformed_inputs() {
        assert!(ConfirmInputs::parse(None).items.is_empty());

        let malformed = serde_json::json!({"items": "not-a-list"});
        assert!(ConfirmInputs::parse(Some(&malformed)).items.is_empty());

        let well_formed = serde_json::json!({
            "items": [{"id": "p1", "quantity": 2}],
            "buyer_id": "buyer-7",
            "total_amount": 42.5,
        });
        let parsed = ConfirmInputs::parse(Some(&well_formed));
        assert_eq!(parsed.items, vec![line("p1", 2)]);
        assert_eq!(parsed.buyer_id.as_deref(), Some("buyer-7"));
        assert_eq!(parsed.total_amount, Some(42.5));
    }
}
