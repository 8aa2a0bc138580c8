//! Shared types for the order service.
//!
//! Identifiers are newtypes so an account id can never be passed where a
//! product id is expected, and money is kept in integer cents.

mod money;
mod types;

pub use money::Money;
pub use types::{AccountId, OrderId, ProductId};
