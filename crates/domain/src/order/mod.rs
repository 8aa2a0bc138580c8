//! Order model and workflows.

mod commands;
mod hydrate;
mod model;
mod service;

pub use commands::{CreateOrder, RequestedItem};
pub use hydrate::{distinct_product_ids, hydrate_orders};
pub use model::{Order, OrderedProduct};
pub use service::{DEFAULT_REMOTE_TIMEOUT, OrderService, OrderServiceConfig};
