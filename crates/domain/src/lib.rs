//! Domain layer for the order service.
//!
//! This crate provides:
//! - the hydrated [`Order`] / [`OrderedProduct`] model returned to callers
//! - the product hydrator that merges catalog metadata into stored line items
//! - [`OrderService`], which runs the creation and retrieval workflows
//!   against an order store, the account directory and the catalog

pub mod error;
pub mod order;

pub use common::{AccountId, Money, OrderId, ProductId};
pub use error::{OrderError, Result, StorageError, UpstreamError};
pub use order::{
    CreateOrder, DEFAULT_REMOTE_TIMEOUT, Order, OrderService, OrderServiceConfig, OrderedProduct,
    RequestedItem, distinct_product_ids, hydrate_orders,
};
