use serde::Serialize;
use store::{OrderRecord, OrderStore, ProductStore};

use crate::error::{CatalogError, Result};

/// The fixed set of statuses an order may be moved to.
pub const ALLOWED_ORDER_STATUSES: [&str; 5] =
    ["PENDING", "ACCEPTED", "SHIPPED", "DELIVERED", "CANCELLED"];

/// Dashboard aggregates for a seller or buyer.
///
/// For buyers `products_count` is always zero and `revenue` holds total
/// spend instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub products_count: i64,
    pub orders_count: i64,
    pub revenue: f64,
    pub pending_orders_count: i64,
}

/// Service for order listings, status updates and dashboard stats.
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore + ProductStore> OrderService<S> {
    /// Creates a new order service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Orders for a seller, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn seller_orders(&self, seller_id: &str) -> Result<Vec<OrderRecord>> {
        Ok(self.store.orders_by_seller(seller_id).await?)
    }

    /// Orders for a buyer, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn buyer_orders(&self, buyer_id: &str) -> Result<Vec<OrderRecord>> {
        Ok(self.store.orders_by_buyer(buyer_id).await?)
    }

    /// Moves an order to a new status from the fixed allowed set.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(&self, id: &str, status: &str) -> Result<OrderRecord> {
        if !ALLOWED_ORDER_STATUSES.contains(&status) {
            return Err(CatalogError::InvalidStatus(status.to_string()));
        }

        self.store
            .update_order_status(id, status)
            .await?
            .ok_or_else(|| CatalogError::OrderNotFound(id.to_string()))
    }

    /// Aggregates for a seller dashboard.
    #[tracing::instrument(skip(self))]
    pub async fn seller_stats(&self, seller_id: &str) -> Result<OrderStats> {
        let products_count = self.store.product_count_by_seller(seller_id).await?;
        let orders = self.store.orders_by_seller(seller_id).await?;

        Ok(Self::aggregate(products_count, &orders))
    }

    /// Aggregates for a buyer dashboard; revenue holds total spend.
    #[tracing::instrument(skip(self))]
    pub async fn buyer_stats(&self, buyer_id: &str) -> Result<OrderStats> {
        let orders = self.store.orders_by_buyer(buyer_id).await?;

        Ok(Self::aggregate(0, &orders))
    }

    fn aggregate(products_count: i64, orders: &[OrderRecord]) -> OrderStats {
        OrderStats {
            products_count,
            orders_count: orders.len() as i64,
            revenue: orders.iter().map(|o| o.total_amount).sum(),
            pending_orders_count: orders.iter().filter(|o| o.status == "PENDING").count() as i64,
        }
    }
}
