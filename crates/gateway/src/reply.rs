use common::TransactionId;
use serde::{Deserialize, Serialize};

/// Result of starting a flow.
///
/// The transaction id is always present: when the remote reply omits one,
/// the client generates it so the caller can correlate follow-up steps.
#[derive(Debug, Clone)]
pub struct StartReply {
    pub transaction_id: TransactionId,
    pub status: Option<String>,
}

/// Raw reply from a flow-advance call.
///
/// The mock service attaches varying fields per flow step, so everything
/// beyond the known trio is kept verbatim in `extra` and echoed back to
/// clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FlowReply {
    /// Whether the reply counts as a successful confirmation: an explicit
    /// `CONFIRMED`/`SUCCESS` status, or no error field at all.
    pub fn indicates_success(&self) -> bool {
        matches!(self.status.as_deref(), Some("CONFIRMED") | Some("SUCCESS"))
            || self.error.is_none()
    }
}
