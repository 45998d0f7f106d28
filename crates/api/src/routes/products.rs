//! Product CRUD endpoints. Raw JSON bodies; failures answer `{error}`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use gateway::MarketplaceGateway;
use store::{MarketStore, NewProduct, ProductChanges, ProductRecord};

use crate::AppState;
use crate::error::CrudError;

/// POST /api/products — add a product to the catalog.
#[tracing::instrument(skip(state, body))]
pub async fn add<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ProductRecord>), CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let input: NewProduct = serde_json::from_value(body).map_err(|_| {
        CrudError::bad_request("Missing required fields (name, price, seller_id)")
    })?;

    let product = state.products.add_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products — list all products.
#[tracing::instrument(skip(state))]
pub async fn list<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
) -> Result<Json<Vec<ProductRecord>>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    Ok(Json(state.products.all_products().await?))
}

/// GET /api/products/search?q= — search by name or category.
#[tracing::instrument(skip(state))]
pub async fn search<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ProductRecord>>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let query = params
        .get("q")
        .filter(|q| !q.is_empty())
        .ok_or_else(|| CrudError::bad_request("Missing query parameter q"))?;

    Ok(Json(state.products.search_products(query).await?))
}

/// GET /api/products/seller/:seller_id — list a seller's products.
#[tracing::instrument(skip(state))]
pub async fn by_seller<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(seller_id): Path<String>,
) -> Result<Json<Vec<ProductRecord>>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    Ok(Json(state.products.seller_products(&seller_id).await?))
}

/// PUT /api/products/:id — partial update, scoped to the owning seller.
#[tracing::instrument(skip(state, body))]
pub async fn update<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ProductRecord>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let seller_id = body
        .get("seller_id")
        .and_then(|s| s.as_str())
        .map(String::from)
        .ok_or_else(|| CrudError::bad_request("Missing productId or seller_id"))?;

    // seller_id is the ownership proof, not an updatable column; the
    // changes struct simply has no such field.
    let changes: ProductChanges = serde_json::from_value(body)
        .map_err(|e| CrudError::bad_request(e.to_string()))?;

    let product = state.products.update_product(&id, &seller_id, changes).await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id?seller_id= — delete, scoped to the owning seller.
#[tracing::instrument(skip(state))]
pub async fn remove<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, CrudError>
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let seller_id = params
        .get("seller_id")
        .ok_or_else(|| CrudError::bad_request("Missing productId or seller_id"))?;

    state.products.delete_product(&id, seller_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Product deleted",
    })))
}
