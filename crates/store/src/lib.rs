//! Relational persistence for the BharatMandi backend.
//!
//! Three tables back the system: `transactions` (checkout flow state keyed
//! by transaction id, with a unique session/flow pair for idempotency),
//! `products` (catalog rows with a mutable stock quantity) and `orders`
//! (records created after a confirmed checkout).
//!
//! Each table gets its own trait so consumers can depend on exactly the
//! surface they touch; [`MarketStore`] unions the three for the orchestrator
//! and the API state. [`InMemoryStore`] backs tests, [`PostgresStore`] backs
//! production.

pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod product;
pub mod transaction;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use order::{NewOrder, OrderRecord, OrderStore};
pub use postgres::PostgresStore;
pub use product::{NewProduct, ProductChanges, ProductRecord, ProductStore};
pub use transaction::{NewTransaction, TransactionRecord, TransactionStore};

/// Union of the three table traits, for components that coordinate across
/// all of them.
pub trait MarketStore: TransactionStore + ProductStore + OrderStore {}

impl<T: TransactionStore + ProductStore + OrderStore> MarketStore for T {}
