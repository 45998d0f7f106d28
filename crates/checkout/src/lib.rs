//! Checkout flow orchestration.
//!
//! Drives the four-step marketplace flow (search → select → init → confirm)
//! against the external gateway while persisting transaction state in the
//! relational store. The `(session_id, flow_id)` pair is the idempotency key:
//! a repeated `search` returns the existing transaction without restarting
//! the remote flow.
//!
//! A successful `confirm` runs the stock reservation sequence: each ordered
//! item is decremented with a conditional write, and any partway failure
//! rolls already-applied decrements back before the error surfaces. The
//! rollback itself is best-effort; the backing store offers no multi-row
//! atomic commit here.

pub mod error;
pub mod orchestrator;
pub mod status;
pub mod stock;

pub use error::CheckoutError;
pub use orchestrator::{
    CheckoutOrchestrator, CreatedFlow, DEFAULT_USECASE_ID, Persistence, SearchOutcome,
};
pub use status::FlowStatus;
pub use stock::{ConfirmInputs, LineItem};
