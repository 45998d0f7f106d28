use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A persisted catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock_quantity: i64,
    pub image_url: Option<String>,
    pub seller_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new product; the store assigns id and timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub seller_id: String,
}

/// Partial update for a product. `None` fields keep their current value;
/// `seller_id` is deliberately absent because ownership is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock_quantity: Option<i64>,
    pub image_url: Option<String>,
}

/// Persistence operations on the `products` table.
///
/// All mutating operations are seller-scoped: a write for a product owned by
/// a different seller affects zero rows. The conditional
/// [`decrement_stock`](ProductStore::decrement_stock) write is the only
/// concurrency safeguard the confirm sequence has, so implementations must
/// make it a single compare-and-swap statement.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a product and returns the stored row.
    async fn insert_product(&self, input: NewProduct) -> Result<ProductRecord>;

    /// All products, newest first.
    async fn all_products(&self) -> Result<Vec<ProductRecord>>;

    /// Products owned by a seller, newest first.
    async fn products_by_seller(&self, seller_id: &str) -> Result<Vec<ProductRecord>>;

    /// Products whose name or category contains the query, newest first.
    async fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>>;

    /// Applies a partial update if the product exists and is owned by
    /// `seller_id`. Returns the updated row, or `None` when nothing matched.
    async fn update_product(
        &self,
        id: &str,
        seller_id: &str,
        changes: ProductChanges,
    ) -> Result<Option<ProductRecord>>;

    /// Deletes a product if owned by `seller_id`. Returns whether a row was
    /// removed.
    async fn delete_product(&self, id: &str, seller_id: &str) -> Result<bool>;

    /// Current stock for a product, or `None` if it does not exist.
    async fn stock_quantity(&self, id: &str) -> Result<Option<i64>>;

    /// Conditionally decrements stock: writes `stock - quantity` only while
    /// the current stock still equals `expected`. Returns `false` when the
    /// condition no longer held (lost race) and nothing was written.
    async fn decrement_stock(&self, id: &str, quantity: i64, expected: i64) -> Result<bool>;

    /// Unconditionally overwrites a product's stock. Used by rollback.
    async fn set_stock(&self, id: &str, quantity: i64) -> Result<()>;

    /// Number of products owned by a seller.
    async fn product_count_by_seller(&self, seller_id: &str) -> Result<i64>;
}
