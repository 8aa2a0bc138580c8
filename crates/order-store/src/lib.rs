//! Order persistence for the order service.
//!
//! Orders are written as a header row plus one row per line item inside a
//! single transaction, and read back as a flat, join-produced row sequence
//! ordered by order id. [`group_rows`] turns that sequence into nested
//! [`OrderRecord`]s.

pub mod error;
pub mod grouping;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod repository;

pub use common::{AccountId, Money, OrderId, ProductId};
pub use error::{Result, StoreError};
pub use grouping::group_rows;
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use record::{LineRecord, OrderRecord, OrderRow};
pub use repository::{OrderRepository, OrderRepositoryExt, validate_record};
