use store::StoreError;
use thiserror::Error;

/// Errors that can occur in the catalog services.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required request field is missing or invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The product does not exist, or is owned by a different seller.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The requested order status is outside the allowed set.
    #[error("Invalid status provided: {0}")]
    InvalidStatus(String),

    /// Store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for catalog results.
pub type Result<T> = std::result::Result<T, CatalogError>;
