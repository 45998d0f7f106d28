use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{FlowId, SessionId, TransactionId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    NewOrder, NewProduct, NewTransaction, OrderRecord, OrderStore, ProductChanges, ProductRecord,
    ProductStore, Result, StoreError, TransactionRecord, TransactionStore,
};

#[derive(Debug, Default)]
struct State {
    transactions: Vec<TransactionRecord>,
    products: HashMap<String, ProductRecord>,
    product_order: Vec<String>,
    orders: Vec<OrderRecord>,
    fail_transaction_inserts: bool,
    fail_order_inserts: bool,
    conflict_on_decrement: bool,
}

/// In-memory store implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// failure toggles so tests can drive the best-effort and rollback paths.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures transaction inserts to fail until reset.
    pub async fn set_fail_transaction_inserts(&self, fail: bool) {
        self.state.write().await.fail_transaction_inserts = fail;
    }

    /// Configures order inserts to fail until reset.
    pub async fn set_fail_order_inserts(&self, fail: bool) {
        self.state.write().await.fail_order_inserts = fail;
    }

    /// Makes every conditional stock decrement report a lost race.
    pub async fn set_conflict_on_decrement(&self, conflict: bool) {
        self.state.write().await.conflict_on_decrement = conflict;
    }

    /// Inserts a product row verbatim, keeping the caller's id. Test fixture
    /// helper.
    pub async fn seed_product(&self, product: ProductRecord) {
        let mut state = self.state.write().await;
        state.product_order.push(product.id.clone());
        state.products.insert(product.id.clone(), product);
    }

    /// Returns the number of transaction rows.
    pub async fn transaction_count(&self) -> usize {
        self.state.read().await.transactions.len()
    }

    /// Returns the number of order rows.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the current stock for a product, if it exists.
    pub async fn stock_of(&self, id: &str) -> Option<i64> {
        self.state
            .read()
            .await
            .products
            .get(id)
            .map(|p| p.stock_quantity)
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn insert_transaction(&self, row: NewTransaction) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_transaction_inserts {
            return Err(StoreError::Unavailable(
                "transaction insert rejected".to_string(),
            ));
        }
        // Mirror the Postgres unique constraints.
        if state.transactions.iter().any(|t| {
            t.transaction_id == row.transaction_id
                || (t.session_id == row.session_id && t.flow_id == row.flow_id)
        }) {
            return Err(StoreError::Unavailable(
                "duplicate transaction or session/flow pair".to_string(),
            ));
        }
        state.transactions.push(TransactionRecord {
            transaction_id: row.transaction_id,
            session_id: row.session_id,
            flow_id: row.flow_id,
            status: row.status,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn transaction_by_id(&self, id: &TransactionId) -> Result<Option<TransactionRecord>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .find(|t| &t.transaction_id == id)
            .cloned())
    }

    async fn transaction_by_session(
        &self,
        session_id: &SessionId,
        flow_id: &FlowId,
    ) -> Result<Option<TransactionRecord>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .find(|t| &t.session_id == session_id && &t.flow_id == flow_id)
            .cloned())
    }

    async fn update_transaction_status(&self, id: &TransactionId, status: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(txn) = state
            .transactions
            .iter_mut()
            .find(|t| &t.transaction_id == id)
        {
            txn.status = status.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, input: NewProduct) -> Result<ProductRecord> {
        let now = Utc::now();
        let product = ProductRecord {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            stock_quantity: input.stock_quantity,
            image_url: input.image_url,
            seller_id: input.seller_id,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.product_order.push(product.id.clone());
        state.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn all_products(&self) -> Result<Vec<ProductRecord>> {
        let state = self.state.read().await;
        Ok(state
            .product_order
            .iter()
            .rev()
            .filter_map(|id| state.products.get(id))
            .cloned()
            .collect())
    }

    async fn products_by_seller(&self, seller_id: &str) -> Result<Vec<ProductRecord>> {
        let state = self.state.read().await;
        Ok(state
            .product_order
            .iter()
            .rev()
            .filter_map(|id| state.products.get(id))
            .filter(|p| p.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .product_order
            .iter()
            .rev()
            .filter_map(|id| state.products.get(id))
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn update_product(
        &self,
        id: &str,
        seller_id: &str,
        changes: ProductChanges,
    ) -> Result<Option<ProductRecord>> {
        let mut state = self.state.write().await;
        let Some(product) = state.products.get_mut(id) else {
            return Ok(None);
        };
        if product.seller_id != seller_id {
            return Ok(None);
        }

        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = Some(description);
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(category) = changes.category {
            product.category = category;
        }
        if let Some(stock_quantity) = changes.stock_quantity {
            product.stock_quantity = stock_quantity;
        }
        if let Some(image_url) = changes.image_url {
            product.image_url = Some(image_url);
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: &str, seller_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .products
            .get(id)
            .is_some_and(|p| p.seller_id == seller_id);
        if !owned {
            return Ok(false);
        }
        state.products.remove(id);
        state.product_order.retain(|pid| pid != id);
        Ok(true)
    }

    async fn stock_quantity(&self, id: &str) -> Result<Option<i64>> {
        let state = self.state.read().await;
        Ok(state.products.get(id).map(|p| p.stock_quantity))
    }

    async fn decrement_stock(&self, id: &str, quantity: i64, expected: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.conflict_on_decrement {
            return Ok(false);
        }
        let Some(product) = state.products.get_mut(id) else {
            return Ok(false);
        };
        if product.stock_quantity != expected {
            return Ok(false);
        }
        product.stock_quantity -= quantity;
        product.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_stock(&self, id: &str, quantity: i64) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(product) = state.products.get_mut(id) {
            product.stock_quantity = quantity;
            product.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn product_count_by_seller(&self, seller_id: &str) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| p.seller_id == seller_id)
            .count() as i64)
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, input: NewOrder) -> Result<OrderRecord> {
        let mut state = self.state.write().await;
        if state.fail_order_inserts {
            return Err(StoreError::Unavailable("order insert rejected".to_string()));
        }
        let now = Utc::now();
        let order = OrderRecord {
            id: Uuid::new_v4().to_string(),
            customer_name: input.customer_name,
            buyer_id: input.buyer_id,
            seller_id: input.seller_id,
            items: input.items,
            total_amount: input.total_amount,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn orders_by_seller(&self, seller_id: &str) -> Result<Vec<OrderRecord>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| o.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn orders_by_buyer(&self, buyer_id: &str) -> Result<Vec<OrderRecord>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(&self, id: &str, status: &str) -> Result<Option<OrderRecord>> {
        let mut state = self.state.write().await;
        let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        order.status = status.to_string();
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}
