use common::TransactionId;
use gateway::GatewayError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while driving a checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No transaction row exists for the given id.
    #[error("Transaction session not found: {0}")]
    TransactionNotFound(TransactionId),

    /// An ordered item exceeds the available stock (or the product is gone).
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// The conditional stock write lost a race with a concurrent decrement.
    #[error("Stock update failed for product {product_id}")]
    StockUpdateConflict { product_id: String },

    /// Marketplace gateway failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Store failure on the critical path.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
