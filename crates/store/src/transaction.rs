use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{FlowId, SessionId, TransactionId};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A persisted checkout transaction row.
///
/// The `(session_id, flow_id)` pair maps to at most one row; it is the
/// idempotency key for `search`. Rows are never deleted, only their status
/// column is rewritten as the flow advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub session_id: SessionId,
    pub flow_id: FlowId,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new transaction row.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_id: TransactionId,
    pub session_id: SessionId,
    pub flow_id: FlowId,
    pub status: String,
}

/// Persistence operations on the `transactions` table.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a new transaction row.
    async fn insert_transaction(&self, row: NewTransaction) -> Result<()>;

    /// Looks up a transaction by its transaction id.
    async fn transaction_by_id(&self, id: &TransactionId) -> Result<Option<TransactionRecord>>;

    /// Looks up a transaction by the exact `(session_id, flow_id)` pair.
    async fn transaction_by_session(
        &self,
        session_id: &SessionId,
        flow_id: &FlowId,
    ) -> Result<Option<TransactionRecord>>;

    /// Rewrites the status column of an existing transaction.
    async fn update_transaction_status(&self, id: &TransactionId, status: &str) -> Result<()>;
}
