//! Checkout flow endpoints.
//!
//! All responses here use the `{success: true, data}` envelope; failures
//! funnel through [`ApiError`] into `{success: false, code, message}`.
//! Bodies are taken as raw JSON and validated by hand so missing fields
//! yield the same envelope with a 400.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{FlowId, SessionId, TransactionId};
use gateway::MarketplaceGateway;
use serde::{Deserialize, Serialize};
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlowRequest {
    pub usecase_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub session_id: String,
    pub flow_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProceedRequest {
    pub transaction_id: String,
    pub inputs: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct ManualActionRequest {
    pub action: String,
    pub payload: serde_json::Value,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlowResponse {
    pub session_id: SessionId,
    pub flow_id: FlowId,
    pub transaction_id: TransactionId,
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub transaction_id: TransactionId,
    pub status: String,
    pub from_cache: bool,
}

fn success<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

fn parse<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

// -- Handlers --

/// POST /api/checkout/create-flow — open a fresh session and flow.
///
/// The body is optional; clients may post nothing, `{}`, or a usecase id.
#[tracing::instrument(skip(state, body))]
pub async fn create_flow<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    body: axum::body::Bytes,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let usecase_id = if body.is_empty() {
        None
    } else {
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        parse::<CreateFlowRequest>(value)?.usecase_id
    };

    let created = state.orchestrator.create_flow(usecase_id).await?;

    Ok(success(CreateFlowResponse {
        session_id: created.session_id,
        flow_id: created.flow_id,
        transaction_id: created.transaction_id,
        status: created.status,
    }))
}

/// POST /api/search — start or resume the flow for a session/flow pair.
#[tracing::instrument(skip(state, body))]
pub async fn search<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let req: SearchRequest = parse(body)?;

    let outcome = state
        .orchestrator
        .search(&SessionId::new(req.session_id), &FlowId::new(req.flow_id))
        .await?;

    Ok(success(SearchResponse {
        transaction_id: outcome.transaction_id,
        status: outcome.status,
        from_cache: outcome.from_cache,
    }))
}

/// POST /api/select — advance the flow with an offer selection.
#[tracing::instrument(skip(state, body))]
pub async fn select<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let req: ProceedRequest = parse(body)?;

    let reply = state
        .orchestrator
        .select(&TransactionId::new(req.transaction_id), req.inputs.as_ref())
        .await?;

    Ok(success(reply))
}

/// POST /api/init — advance the flow with checkout initialization.
#[tracing::instrument(skip(state, body))]
pub async fn init<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let req: ProceedRequest = parse(body)?;

    let reply = state
        .orchestrator
        .init(&TransactionId::new(req.transaction_id), req.inputs.as_ref())
        .await?;

    Ok(success(reply))
}

/// POST /api/confirm — confirm the flow and reserve ordered stock.
#[tracing::instrument(skip(state, body))]
pub async fn confirm<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let req: ProceedRequest = parse(body)?;

    let reply = state
        .orchestrator
        .confirm(&TransactionId::new(req.transaction_id), req.inputs.as_ref())
        .await?;

    Ok(success(reply))
}

/// GET /api/status/:transaction_id — return the persisted transaction row.
#[tracing::instrument(skip(state))]
pub async fn status<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let row = state
        .orchestrator
        .get_status(&TransactionId::new(transaction_id))
        .await?;

    Ok(success(row))
}

/// POST /api/action — fire an operator-triggered action on the mock service.
#[tracing::instrument(skip(state, body))]
pub async fn manual_action<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let req: ManualActionRequest = parse(body)?;

    let reply = state
        .gateway
        .trigger_manual_action(&req.action, &req.payload)
        .await?;

    Ok(success(reply))
}
