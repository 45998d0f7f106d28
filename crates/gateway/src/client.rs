use std::time::Duration;

use async_trait::async_trait;
use common::{FlowId, SessionId, TransactionId};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::GatewayError;
use crate::reply::{FlowReply, StartReply};

/// Fixed per-request timeout; the orchestrator itself sets no deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Health probe attempts and the pause between them.
const HEALTH_ATTEMPTS: u32 = 3;
const HEALTH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Operations the checkout orchestrator consumes from the marketplace.
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    /// Opens a flow for a session. Assigns a transaction id locally when the
    /// remote reply does not carry one.
    async fn start_flow(
        &self,
        flow_id: &FlowId,
        session_id: &SessionId,
    ) -> Result<StartReply, GatewayError>;

    /// Advances a flow with arbitrary structured inputs.
    async fn proceed_flow(
        &self,
        transaction_id: &TransactionId,
        session_id: &SessionId,
        inputs: Option<&serde_json::Value>,
    ) -> Result<FlowReply, GatewayError>;

    /// Fires an operator-triggered action against the mock service.
    async fn trigger_manual_action(
        &self,
        action: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Startup-only reachability probe; never raises.
    async fn check_health(&self) -> bool {
        true
    }
}

/// Marketplace client over HTTP.
#[derive(Clone)]
pub struct HttpMarketplaceGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMarketplaceGateway {
    /// Creates a client for the mock service at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GatewayError::from)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the remote's message field when it sent one.
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("message")?.as_str().map(String::from))
                .unwrap_or_else(|| format!("marketplace returned {status}"));
            return Err(GatewayError::remote(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))
    }
}

#[async_trait]
impl MarketplaceGateway for HttpMarketplaceGateway {
    #[tracing::instrument(skip(self))]
    async fn start_flow(
        &self,
        flow_id: &FlowId,
        session_id: &SessionId,
    ) -> Result<StartReply, GatewayError> {
        // Idempotent session init; the session may already exist remotely.
        if let Err(e) = self
            .post_json::<serde_json::Value>("/session/create", &json!({ "sessionId": session_id }))
            .await
        {
            tracing::debug!(error = %e, "session init skipped");
        }

        let reply: FlowReply = self
            .post_json(
                "/flow/start",
                &json!({ "flowId": flow_id, "sessionId": session_id }),
            )
            .await?;

        let transaction_id = reply
            .transaction_id
            .unwrap_or_else(TransactionId::generate);

        Ok(StartReply {
            transaction_id,
            status: reply.status,
        })
    }

    #[tracing::instrument(skip(self, inputs))]
    async fn proceed_flow(
        &self,
        transaction_id: &TransactionId,
        session_id: &SessionId,
        inputs: Option<&serde_json::Value>,
    ) -> Result<FlowReply, GatewayError> {
        self.post_json(
            "/flow/proceed",
            &json!({
                "transactionId": transaction_id,
                "sessionId": session_id,
                "inputs": inputs,
            }),
        )
        .await
    }

    #[tracing::instrument(skip(self, payload))]
    async fn trigger_manual_action(
        &self,
        action: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        self.post_json(
            "/action/trigger",
            &json!({ "action": action, "payload": payload }),
        )
        .await
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        for attempt in 1..=HEALTH_ATTEMPTS {
            match self
                .client
                .get(&url)
                .header("X-API-Key", &self.api_key)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    tracing::info!("marketplace mock service reachable");
                    return true;
                }
                Ok(response) => {
                    tracing::warn!(status = %response.status(), attempt, "marketplace health probe rejected");
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "marketplace unreachable");
                }
            }
            if attempt < HEALTH_ATTEMPTS {
                tokio::time::sleep(HEALTH_RETRY_DELAY).await;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn gateway_for(server: &MockServer) -> HttpMarketplaceGateway {
        HttpMarketplaceGateway::new(server.uri(), "test-key").unwrap()
    }

    #[tokio::test]
    async fn start_flow_returns_remote_transaction_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flow/start"))
            .and(header("X-API-Key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "flowId": "agricultural_flow_1",
                "sessionId": "sess-1",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "transactionId": "txn-remote",
                "status": "INITIATED",
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let reply = gateway
            .start_flow(&FlowId::new("agricultural_flow_1"), &SessionId::new("sess-1"))
            .await
            .unwrap();

        assert_eq!(reply.transaction_id, TransactionId::new("txn-remote"));
        assert_eq!(reply.status.as_deref(), Some("INITIATED"));
    }

    #[tokio::test]
    async fn start_flow_generates_transaction_id_when_remote_omits_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flow/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let reply = gateway
            .start_flow(&FlowId::new("flow"), &SessionId::new("sess-1"))
            .await
            .unwrap();

        assert!(!reply.transaction_id.as_str().is_empty());
        assert!(reply.status.is_none());
    }

    #[tokio::test]
    async fn start_flow_survives_failed_session_init() {
        let server = MockServer::start().await;
        // No /session/create mount: the init call 404s and must be swallowed.
        Mock::given(method("POST"))
            .and(path("/flow/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "transactionId": "txn-1",
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        assert!(
            gateway
                .start_flow(&FlowId::new("flow"), &SessionId::new("sess-1"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn remote_failure_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flow/proceed"))
            .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
                "message": "upstream exploded",
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let err = gateway
            .proceed_flow(
                &TransactionId::new("txn-1"),
                &SessionId::new("sess-1"),
                None,
            )
            .await
            .unwrap_err();

        assert_eq!(err.status, 502);
        assert_eq!(err.code, crate::GATEWAY_ERROR_CODE);
        assert_eq!(err.message, "upstream exploded");
    }

    #[tokio::test]
    async fn proceed_flow_passes_inputs_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flow/proceed"))
            .and(body_partial_json(serde_json::json!({
                "transactionId": "txn-1",
                "inputs": {"items": [{"id": "p1", "quantity": 2}]},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "CONFIRMED",
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        let inputs = serde_json::json!({"items": [{"id": "p1", "quantity": 2}]});
        let reply = gateway
            .proceed_flow(
                &TransactionId::new("txn-1"),
                &SessionId::new("sess-1"),
                Some(&inputs),
            )
            .await
            .unwrap();

        assert_eq!(reply.status.as_deref(), Some("CONFIRMED"));
    }

    #[tokio::test]
    async fn health_probe_true_when_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        assert!(gateway.check_health().await);
    }

    #[tokio::test]
    async fn health_probe_false_after_exhausting_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server).await;
        assert!(!gateway.check_health().await);
    }
}
