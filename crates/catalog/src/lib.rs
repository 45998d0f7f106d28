//! Product and order services backing the seller and buyer dashboards.
//!
//! Plain pass-through CRUD and aggregation over the store; the only
//! invariant enforced here is ownership: product writes are scoped to the
//! owning seller, and order status updates are restricted to a fixed set.

pub mod error;
pub mod orders;
pub mod products;

pub use error::CatalogError;
pub use orders::{ALLOWED_ORDER_STATUSES, OrderService, OrderStats};
pub use products::ProductService;
