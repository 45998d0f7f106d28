use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{FlowId, SessionId, TransactionId};

use crate::client::MarketplaceGateway;
use crate::error::GatewayError;
use crate::reply::{FlowReply, StartReply};

#[derive(Debug, Default)]
struct MockState {
    start_calls: u32,
    proceed_calls: u32,
    fail_on_start: bool,
    fail_on_proceed: bool,
    next_transaction_id: Option<TransactionId>,
    next_status: Option<String>,
    next_error: Option<serde_json::Value>,
}

/// In-memory marketplace gateway for testing.
///
/// Counts calls and lets tests script the next reply or force failures.
#[derive(Debug, Clone, Default)]
pub struct MockMarketplaceGateway {
    state: Arc<RwLock<MockState>>,
}

impl MockMarketplaceGateway {
    /// Creates a new mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures start calls to fail until reset.
    pub fn set_fail_on_start(&self, fail: bool) {
        self.state.write().unwrap().fail_on_start = fail;
    }

    /// Configures proceed calls to fail until reset.
    pub fn set_fail_on_proceed(&self, fail: bool) {
        self.state.write().unwrap().fail_on_proceed = fail;
    }

    /// Fixes the transaction id handed out by the next start call.
    pub fn set_next_transaction_id(&self, id: impl Into<TransactionId>) {
        self.state.write().unwrap().next_transaction_id = Some(id.into());
    }

    /// Fixes the status returned by subsequent replies.
    pub fn set_next_status(&self, status: impl Into<String>) {
        self.state.write().unwrap().next_status = Some(status.into());
    }

    /// Attaches an error field to subsequent proceed replies.
    pub fn set_next_error(&self, error: serde_json::Value) {
        self.state.write().unwrap().next_error = Some(error);
    }

    /// Number of start calls observed.
    pub fn start_call_count(&self) -> u32 {
        self.state.read().unwrap().start_calls
    }

    /// Number of proceed calls observed.
    pub fn proceed_call_count(&self) -> u32 {
        self.state.read().unwrap().proceed_calls
    }
}

#[async_trait]
impl MarketplaceGateway for MockMarketplaceGateway {
    async fn start_flow(
        &self,
        _flow_id: &FlowId,
        _session_id: &SessionId,
    ) -> Result<StartReply, GatewayError> {
        let mut state = self.state.write().unwrap();
        state.start_calls += 1;

        if state.fail_on_start {
            return Err(GatewayError::remote(503, "marketplace unavailable"));
        }

        let transaction_id = state
            .next_transaction_id
            .take()
            .unwrap_or_else(TransactionId::generate);

        Ok(StartReply {
            transaction_id,
            status: state.next_status.clone(),
        })
    }

    async fn proceed_flow(
        &self,
        transaction_id: &TransactionId,
        _session_id: &SessionId,
        _inputs: Option<&serde_json::Value>,
    ) -> Result<FlowReply, GatewayError> {
        let mut state = self.state.write().unwrap();
        state.proceed_calls += 1;

        if state.fail_on_proceed {
            return Err(GatewayError::remote(502, "flow advance rejected"));
        }

        Ok(FlowReply {
            transaction_id: Some(transaction_id.clone()),
            status: state.next_status.clone(),
            error: state.next_error.clone(),
            extra: serde_json::Map::new(),
        })
    }

    async fn trigger_manual_action(
        &self,
        action: &str,
        _payload: &serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        Ok(serde_json::json!({ "action": action, "triggered": true }))
    }
}
