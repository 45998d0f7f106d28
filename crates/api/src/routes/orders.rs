//! Order listing, stats and status endpoints. Raw JSON bodies; failures
//! answer `{error}`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use catalog::OrderStats;
use gateway::MarketplaceGateway;
use serde::Deserialize;
use store::{MarketStore, OrderRecord};

use crate::AppState;
use crate::error::CrudError;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// GET /api/orders/seller/:seller_id — list a seller's orders.
#[tracing::instrument(skip(state))]
pub async fn by_seller<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(seller_id): Path<String>,
) -> Result<Json<Vec<OrderRecord>>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    Ok(Json(state.orders.seller_orders(&seller_id).await?))
}

/// GET /api/orders/buyer/:buyer_id — list a buyer's orders.
#[tracing::instrument(skip(state))]
pub async fn by_buyer<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(buyer_id): Path<String>,
) -> Result<Json<Vec<OrderRecord>>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    Ok(Json(state.orders.buyer_orders(&buyer_id).await?))
}

/// GET /api/orders/seller/:seller_id/stats — seller dashboard aggregates.
#[tracing::instrument(skip(state))]
pub async fn seller_stats<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(seller_id): Path<String>,
) -> Result<Json<OrderStats>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    Ok(Json(state.orders.seller_stats(&seller_id).await?))
}

/// GET /api/orders/buyer/:buyer_id/stats — buyer dashboard aggregates.
#[tracing::instrument(skip(state))]
pub async fn buyer_stats<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(buyer_id): Path<String>,
) -> Result<Json<OrderStats>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    Ok(Json(state.orders.buyer_stats(&buyer_id).await?))
}

/// PATCH /api/orders/:id/status — move an order through its lifecycle.
#[tracing::instrument(skip(state, body))]
pub async fn update_status<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<OrderRecord>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let req: UpdateStatusRequest = serde_json::from_value(body)
        .map_err(|_| CrudError::bad_request("Missing orderId or status"))?;

    let order = state.orders.update_order_status(&id, &req.status).await?;
    Ok(Json(order))
}
