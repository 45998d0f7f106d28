//! Client for the external mock marketplace service.
//!
//! The checkout flow is driven remotely: `start_flow` opens a flow for a
//! session, `proceed_flow` advances it through select/init/confirm. Both
//! normalize transport and remote failures into a single [`GatewayError`]
//! shape and never retry; only the startup health probe retries, and it
//! returns a bool instead of raising.

pub mod client;
pub mod error;
pub mod mock;
pub mod reply;

pub use client::{HttpMarketplaceGateway, MarketplaceGateway};
pub use error::{GATEWAY_ERROR_CODE, GatewayError};
pub use mock::MockMarketplaceGateway;
pub use reply::{FlowReply, StartReply};
