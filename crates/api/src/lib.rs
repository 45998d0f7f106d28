//! HTTP API server for the BharatMandi backend.
//!
//! Exposes the checkout flow endpoints (wrapped in a `{success, data}`
//! envelope), the product/order CRUD endpoints (raw JSON bodies), and the
//! operational health/metrics endpoints, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use catalog::{OrderService, ProductService};
use checkout::CheckoutOrchestrator;
use gateway::MarketplaceGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use store::MarketStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: MarketStore, G: MarketplaceGateway> {
    pub orchestrator: CheckoutOrchestrator<S, G>,
    pub products: ProductService<S>,
    pub orders: OrderService<S>,
    pub gateway: G,
    pub store: S,
}

/// Wires the services around a store and gateway pair.
pub fn create_state<S, G>(store: S, gateway: G) -> Arc<AppState<S, G>>
where
    S: MarketStore + Clone,
    G: MarketplaceGateway + Clone,
{
    Arc::new(AppState {
        orchestrator: CheckoutOrchestrator::new(store.clone(), gateway.clone()),
        products: ProductService::new(store.clone()),
        orders: OrderService::new(store.clone()),
        gateway,
        store,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, G>(state: Arc<AppState<S, G>>, metrics_handle: PrometheusHandle) -> Router
where
    S: MarketStore + Clone + 'static,
    G: MarketplaceGateway + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/checkout/create-flow",
            post(routes::checkout::create_flow::<S, G>),
        )
        .route("/api/search", post(routes::checkout::search::<S, G>))
        .route("/api/select", post(routes::checkout::select::<S, G>))
        .route("/api/init", post(routes::checkout::init::<S, G>))
        .route("/api/confirm", post(routes::checkout::confirm::<S, G>))
        .route(
            "/api/status/{transaction_id}",
            get(routes::checkout::status::<S, G>),
        )
        .route("/api/action", post(routes::checkout::manual_action::<S, G>))
        .route(
            "/api/products",
            post(routes::products::add::<S, G>).get(routes::products::list::<S, G>),
        )
        .route(
            "/api/products/search",
            get(routes::products::search::<S, G>),
        )
        .route(
            "/api/products/seller/{seller_id}",
            get(routes::products::by_seller::<S, G>),
        )
        .route(
            "/api/products/{id}",
            put(routes::products::update::<S, G>).delete(routes::products::remove::<S, G>),
        )
        .route(
            "/api/orders/seller/{seller_id}",
            get(routes::orders::by_seller::<S, G>),
        )
        .route(
            "/api/orders/seller/{seller_id}/stats",
            get(routes::orders::seller_stats::<S, G>),
        )
        .route(
            "/api/orders/buyer/{buyer_id}",
            get(routes::orders::by_buyer::<S, G>),
        )
        .route(
            "/api/orders/buyer/{buyer_id}/stats",
            get(routes::orders::buyer_stats::<S, G>),
        )
        .route(
            "/api/orders/{id}/status",
            patch(routes::orders::update_status::<S, G>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
