//! Clients for the services the order service reads from.
//!
//! Both upstreams are modeled as capability traits so the order workflows
//! can run against deterministic in-memory fakes in tests and against the
//! real services over HTTP in production:
//! - [`AccountService`]: account existence checks
//! - [`CatalogService`]: batched product lookups (partial results allowed)

pub mod account;
pub mod catalog;
pub mod error;
pub mod http;

pub use account::{Account, AccountService, InMemoryAccountService};
pub use catalog::{CatalogService, InMemoryCatalogService, Product};
pub use error::{ClientError, Result};
pub use http::{HttpAccountService, HttpCatalogService};
