use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AccountId, OrderRecord, OrderRow, Result, StoreError,
    repository::{OrderRepository, validate_record},
};

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: Vec<OrderRecord>,
    fail_on_write: bool,
    fail_on_read: bool,
    write_delay: Option<Duration>,
}

/// In-memory order store implementation for testing.
///
/// Provides the same read ordering as the PostgreSQL implementation and can
/// be told to fail writes or reads.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns a copy of every stored order, in insertion order.
    pub async fn orders(&self) -> Vec<OrderRecord> {
        self.state.read().await.orders.clone()
    }

    /// Configures the store to fail subsequent writes.
    pub async fn set_fail_on_write(&self, fail: bool) {
        self.state.write().await.fail_on_write = fail;
    }

    /// Configures the store to fail subsequent reads.
    pub async fn set_fail_on_read(&self, fail: bool) {
        self.state.write().await.fail_on_read = fail;
    }

    /// Makes every write wait before it is applied.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        self.state.write().await.write_delay = delay;
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: &OrderRecord) -> Result<()> {
        validate_record(order)?;

        let delay = self.state.read().await.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().await;

        if state.fail_on_write {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }

        if state.orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::InvalidRecord(format!(
                "order {} already exists",
                order.id
            )));
        }

        // Header and lines go in as one value, so a failed write leaves nothing behind.
        state.orders.push(order.clone());
        Ok(())
    }

    async fn get_order_rows_for_account(&self, account_id: &AccountId) -> Result<Vec<OrderRow>> {
        let state = self.state.read().await;

        if state.fail_on_read {
            return Err(StoreError::Unavailable("read rejected".to_string()));
        }

        let mut orders: Vec<&OrderRecord> = state
            .orders
            .iter()
            .filter(|o| &o.account_id == account_id)
            .collect();
        orders.sort_by_key(|o| o.id);

        Ok(orders.into_iter().flat_map(OrderRecord::to_rows).collect())
    }

    async fn ping(&self) -> Result<()> {
        let state = self.state.read().await;
        if state.fail_on_read {
            return Err(StoreError::Unavailable("ping rejected".to_string()));
        }
        Ok(())
    }
}
