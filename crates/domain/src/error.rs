//! Domain error types.

use std::time::Duration;

use clients::ClientError;
use common::{AccountId, ProductId};
use order_store::StoreError;
use thiserror::Error;

/// Failure of a call to the account directory or the catalog.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of a call to the order store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors returned by the order workflows.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A requested quantity was not a positive 32-bit count.
    #[error("Invalid quantity {quantity} for product {product_id} (must be between 1 and 4294967295)")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    /// The account does not exist, or its existence could not be confirmed.
    #[error("Account not found: {account_id}")]
    AccountNotFound {
        account_id: AccountId,
        #[source]
        cause: Option<UpstreamError>,
    },

    /// The catalog lookup itself failed.
    #[error("Product lookup failed: {0}")]
    ProductLookupFailed(#[source] UpstreamError),

    /// A line total or the order total does not fit in `Money`.
    #[error("Order total overflows for account {account_id}")]
    PriceOverflow { account_id: AccountId },

    /// The order could not be written.
    #[error("Persistence error: {0}")]
    PersistenceError(#[source] StorageError),

    /// Orders could not be read.
    #[error("Retrieval error: {0}")]
    RetrievalError(#[source] StorageError),
}

impl OrderError {
    /// Short, stable name of the error kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::AccountNotFound { .. } => "account_not_found",
            OrderError::ProductLookupFailed(_) => "product_lookup_failed",
            OrderError::PriceOverflow { .. } => "price_overflow",
            OrderError::PersistenceError(_) => "persistence_error",
            OrderError::RetrievalError(_) => "retrieval_error",
        }
    }
}

/// Convenience type alias for order workflow results.
pub type Result<T> = std::result::Result<T, OrderError>;
