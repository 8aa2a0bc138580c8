//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Order workflow error.
    Order(OrderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Order(err) => order_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    let status = match &err {
        OrderError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
        OrderError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
        OrderError::ProductLookupFailed(_) => StatusCode::BAD_GATEWAY,
        OrderError::PriceOverflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        OrderError::PersistenceError(_) | OrderError::RetrievalError(_) => {
            tracing::error!(error = %err, "internal server error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}
