//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use clients::{AccountService, CatalogService};
use order_store::OrderRepository;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: pings the order store.
pub async fn check<R, A, C>(
    State(state): State<Arc<AppState<R, A, C>>>,
) -> (StatusCode, Json<HealthResponse>)
where
    R: OrderRepository,
    A: AccountService,
    C: CatalogService,
{
    match state.order_service.repository().ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "order store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}
