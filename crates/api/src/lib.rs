//! HTTP API server for the order service.
//!
//! Exposes order creation and per-account retrieval over REST, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use clients::{AccountService, CatalogService};
use domain::OrderService;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<R, A, C> {
    pub order_service: OrderService<R, A, C>,
}

impl<R, A, C> AppState<R, A, C>
where
    R: OrderRepository,
    A: AccountService,
    C: CatalogService,
{
    pub fn new(order_service: OrderService<R, A, C>) -> Arc<Self> {
        Arc::new(Self { order_service })
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, A, C>(state: Arc<AppState<R, A, C>>, metrics_handle: PrometheusHandle) -> Router
where
    R: OrderRepository + 'static,
    A: AccountService + 'static,
    C: CatalogService + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<R, A, C>))
        .route("/orders", post(routes::orders::create::<R, A, C>))
        .route(
            "/accounts/{account_id}/orders",
            get(routes::orders::list_for_account::<R, A, C>),
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
