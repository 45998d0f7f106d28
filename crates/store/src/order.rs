use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A persisted order row.
///
/// `items` is stored as raw JSON because clients attach varying item shapes;
/// the confirm sequence writes `[{id, quantity}, ...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub customer_name: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub items: serde_json::Value,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new order; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub items: serde_json::Value,
    pub total_amount: f64,
    pub status: String,
}

/// Persistence operations on the `orders` table.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order and returns the stored row.
    async fn insert_order(&self, input: NewOrder) -> Result<OrderRecord>;

    /// Orders for a seller, newest first.
    async fn orders_by_seller(&self, seller_id: &str) -> Result<Vec<OrderRecord>>;

    /// Orders for a buyer, newest first.
    async fn orders_by_buyer(&self, buyer_id: &str) -> Result<Vec<OrderRecord>>;

    /// Rewrites an order's status. Returns the updated row, or `None` if the
    /// order does not exist.
    async fn update_order_status(&self, id: &str, status: &str) -> Result<Option<OrderRecord>>;
}
