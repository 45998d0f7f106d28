//! Orchestrates the four-step checkout flow against store and gateway.

use common::{FlowId, SessionId, TransactionId};
use gateway::{FlowReply, MarketplaceGateway};
use store::{MarketStore, NewTransaction, TransactionRecord};

use crate::error::CheckoutError;
use crate::status::FlowStatus;
use crate::stock::{self, ConfirmInputs};

/// Usecase driven when the client does not name one.
pub const DEFAULT_USECASE_ID: &str = "agricultural_flow_1";

/// Outcome of a best-effort bookkeeping write.
///
/// Flow steps never fail on these writes; the variant makes the swallowed
/// failure observable instead of hiding it in a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// The row was written.
    Persisted,
    /// The write failed; the flow continued anyway.
    Failed,
}

/// Result of creating a fresh checkout flow.
#[derive(Debug, Clone)]
pub struct CreatedFlow {
    pub session_id: SessionId,
    pub flow_id: FlowId,
    pub transaction_id: TransactionId,
    pub status: String,
    pub persistence: Persistence,
}

/// Result of an idempotent search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub transaction_id: TransactionId,
    pub status: String,
    pub from_cache: bool,
    pub persistence: Persistence,
}

/// Drives checkout flows: session/flow creation, the idempotent search, the
/// select/init/confirm advances, and the stock reservation sequence a
/// successful confirm triggers.
///
/// Store and gateway are injected so tests can substitute in-memory fakes.
pub struct CheckoutOrchestrator<S, G>
where
    S: MarketStore,
    G: MarketplaceGateway,
{
    store: S,
    gateway: G,
}

impl<S, G> CheckoutOrchestrator<S, G>
where
    S: MarketStore,
    G: MarketplaceGateway,
{
    /// Creates a new orchestrator.
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// Creates a checkout flow: generates the session id, starts the remote
    /// flow and persists the transaction row (best-effort).
    ///
    /// The backend owns session/flow creation so client apps never generate
    /// dynamic ids themselves.
    #[tracing::instrument(skip(self))]
    pub async fn create_flow(&self, usecase_id: Option<String>) -> Result<CreatedFlow, CheckoutError> {
        metrics::counter!("checkout_flows_total").increment(1);

        let session_id = SessionId::generate();
        let flow_id = FlowId::new(usecase_id.unwrap_or_else(|| DEFAULT_USECASE_ID.to_string()));
        tracing::info!(%session_id, %flow_id, "creating checkout flow");

        let reply = self.gateway.start_flow(&flow_id, &session_id).await?;
        let status = reply
            .status
            .unwrap_or_else(|| FlowStatus::Initiated.to_string());

        let persistence = self
            .save_transaction(NewTransaction {
                transaction_id: reply.transaction_id.clone(),
                session_id: session_id.clone(),
                flow_id: flow_id.clone(),
                status: status.clone(),
            })
            .await;

        Ok(CreatedFlow {
            session_id,
            flow_id,
            transaction_id: reply.transaction_id,
            status,
            persistence,
        })
    }

    /// Starts (or resumes) the flow for a session/flow pair.
    ///
    /// Idempotent: when a transaction already exists for the exact pair it is
    /// returned unchanged with `from_cache` set, and the remote flow is not
    /// restarted.
    #[tracing::instrument(skip(self))]
    pub async fn search(
        &self,
        session_id: &SessionId,
        flow_id: &FlowId,
    ) -> Result<SearchOutcome, CheckoutError> {
        if let Some(existing) = self
            .store
            .transaction_by_session(session_id, flow_id)
            .await?
        {
            tracing::info!(
                transaction_id = %existing.transaction_id,
                "returning existing transaction for session/flow pair"
            );
            return Ok(SearchOutcome {
                transaction_id: existing.transaction_id,
                status: existing.status,
                from_cache: true,
                persistence: Persistence::Persisted,
            });
        }

        let reply = self.gateway.start_flow(flow_id, session_id).await?;
        let status = reply
            .status
            .unwrap_or_else(|| FlowStatus::Initiated.to_string());

        let persistence = self
            .save_transaction(NewTransaction {
                transaction_id: reply.transaction_id.clone(),
                session_id: session_id.clone(),
                flow_id: flow_id.clone(),
                status: status.clone(),
            })
            .await;

        Ok(SearchOutcome {
            transaction_id: reply.transaction_id,
            status,
            from_cache: false,
            persistence,
        })
    }

    /// Advances the flow with an offer selection.
    #[tracing::instrument(skip(self, inputs))]
    pub async fn select(
        &self,
        transaction_id: &TransactionId,
        inputs: Option<&serde_json::Value>,
    ) -> Result<FlowReply, CheckoutError> {
        self.advance(transaction_id, inputs, FlowStatus::Selected)
            .await
    }

    /// Advances the flow with checkout initialization.
    #[tracing::instrument(skip(self, inputs))]
    pub async fn init(
        &self,
        transaction_id: &TransactionId,
        inputs: Option<&serde_json::Value>,
    ) -> Result<FlowReply, CheckoutError> {
        self.advance(transaction_id, inputs, FlowStatus::Initialized)
            .await
    }

    /// Confirms the flow. When the gateway reports success, reserves stock
    /// for each ordered item and records the order before returning; a
    /// reservation failure propagates even though the remote confirm already
    /// went through.
    #[tracing::instrument(skip(self, inputs))]
    pub async fn confirm(
        &self,
        transaction_id: &TransactionId,
        inputs: Option<&serde_json::Value>,
    ) -> Result<FlowReply, CheckoutError> {
        metrics::counter!("checkout_confirms_total").increment(1);
        let started = std::time::Instant::now();

        let reply = self
            .advance(transaction_id, inputs, FlowStatus::Confirmed)
            .await?;

        if reply.indicates_success() {
            let parsed = ConfirmInputs::parse(inputs);
            let order = stock::reserve_and_record(&self.store, &parsed).await?;
            tracing::info!(%transaction_id, order_id = %order.id, "order recorded after confirmation");
        }

        metrics::histogram!("confirm_duration_seconds").record(started.elapsed().as_secs_f64());
        Ok(reply)
    }

    /// Returns the persisted transaction row.
    #[tracing::instrument(skip(self))]
    pub async fn get_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<TransactionRecord, CheckoutError> {
        self.store
            .transaction_by_id(transaction_id)
            .await?
            .ok_or_else(|| CheckoutError::TransactionNotFound(transaction_id.clone()))
    }

    /// Shared select/init/confirm shape: resolve the session, advance the
    /// remote flow, then update the persisted status (best-effort).
    async fn advance(
        &self,
        transaction_id: &TransactionId,
        inputs: Option<&serde_json::Value>,
        default_status: FlowStatus,
    ) -> Result<FlowReply, CheckoutError> {
        let session_id = self.session_for(transaction_id).await?;
        let reply = self
            .gateway
            .proceed_flow(transaction_id, &session_id, inputs)
            .await?;

        let status = reply
            .status
            .clone()
            .unwrap_or_else(|| default_status.to_string());
        if let Err(e) = self
            .store
            .update_transaction_status(transaction_id, &status)
            .await
        {
            tracing::error!(%transaction_id, error = %e, "failed to update transaction status, continuing");
        }

        Ok(reply)
    }

    /// Resolves the session id for a transaction. Hard dependency: a missing
    /// row fails the request.
    async fn session_for(&self, transaction_id: &TransactionId) -> Result<SessionId, CheckoutError> {
        self.store
            .transaction_by_id(transaction_id)
            .await?
            .map(|row| row.session_id)
            .ok_or_else(|| CheckoutError::TransactionNotFound(transaction_id.clone()))
    }

    async fn save_transaction(&self, row: NewTransaction) -> Persistence {
        let transaction_id = row.transaction_id.clone();
        match self.store.insert_transaction(row).await {
            Ok(()) => Persistence::Persisted,
            Err(e) => {
                tracing::error!(%transaction_id, error = %e, "failed to save transaction, continuing");
                Persistence::Failed
            }
        }
    }
}
