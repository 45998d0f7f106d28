pub mod ids;

pub use ids::{FlowId, SessionId, TransactionId};
