//! Order service: the creation and retrieval workflows.

use std::future::Future;
use std::time::{Duration, Instant};

use clients::{AccountService, CatalogService, ClientError};
use common::AccountId;
use order_store::{OrderRepository, OrderRepositoryExt, StoreError};

use crate::error::{OrderError, Result, StorageError, UpstreamError};

use super::commands::CreateOrder;
use super::hydrate::{distinct_product_ids, hydrate_orders};
use super::model::{Order, OrderedProduct};

/// Default deadline for each call to the account directory, the catalog or
/// the store.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(2);

/// Tunables for [`OrderService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderServiceConfig {
    /// Per-call deadline for every outbound call.
    pub remote_timeout: Duration,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

/// Service orchestrating order creation and retrieval.
///
/// Holds no per-request state; concurrent calls only share the underlying
/// store and clients.
pub struct OrderService<R, A, C> {
    repository: R,
    accounts: A,
    catalog: C,
    config: OrderServiceConfig,
}

impl<R, A, C> OrderService<R, A, C>
where
    R: OrderRepository,
    A: AccountService,
    C: CatalogService,
{
    /// Creates a service with the default configuration.
    pub fn new(repository: R, accounts: A, catalog: C) -> Self {
        Self::with_config(repository, accounts, catalog, OrderServiceConfig::default())
    }

    pub fn with_config(repository: R, accounts: A, catalog: C, config: OrderServiceConfig) -> Self {
        Self {
            repository,
            accounts,
            catalog,
            config,
        }
    }

    /// Returns a reference to the underlying order repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates, prices and persists a new order.
    ///
    /// Steps run strictly in sequence and stop at the first failure: quantity
    /// validation, account check, one batched catalog lookup, then a single
    /// atomic write. Requested products the catalog does not know are left
    /// out of the order. A total that overflows `Money` is rejected with
    /// [`OrderError::PriceOverflow`] before anything is written. The returned
    /// order carries the catalog snapshot its total was computed from.
    #[tracing::instrument(skip(self, cmd), fields(account_id = %cmd.account_id, items = cmd.items.len()))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order> {
        let start = Instant::now();
        let result = self.place_order(cmd).await;
        metrics::histogram!("order_creation_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(
                    order_id = %order.id(),
                    total = %order.total_price(),
                    items = order.item_count(),
                    "order created"
                );
            }
            Err(e) => {
                metrics::counter!("order_creation_failures_total", "reason" => e.kind())
                    .increment(1);
                tracing::warn!(error = %e, reason = e.kind(), "order creation failed");
            }
        }
        result
    }

    async fn place_order(&self, cmd: CreateOrder) -> Result<Order> {
        cmd.validate()?;

        self.ensure_account_exists(&cmd.account_id).await?;

        let product_ids = cmd.product_ids();
        let products = if product_ids.is_empty() {
            Vec::new()
        } else {
            self.call_upstream(self.catalog.get_products_by_ids(&product_ids))
                .await
                .map_err(OrderError::ProductLookupFailed)?
        };

        let quantities = cmd.quantities();
        let items: Vec<OrderedProduct> = product_ids
            .iter()
            .filter_map(|id| {
                let product = products.iter().find(|p| &p.id == id)?;
                let quantity = quantities.get(id).copied()?;
                Some(OrderedProduct::from_catalog(product, quantity))
            })
            .collect();

        if items.len() < product_ids.len() {
            tracing::debug!(
                requested = product_ids.len(),
                resolved = items.len(),
                "unknown products left out of the order"
            );
        }

        let order = Order::place(cmd.account_id, items)?;
        // A deadline that fires while the commit is in flight leaves the
        // outcome unknown; it surfaces as PersistenceError(Timeout).
        self.call_store(self.repository.create_order(&order.to_record()))
            .await
            .map_err(OrderError::PersistenceError)?;

        Ok(order)
    }

    async fn ensure_account_exists(&self, account_id: &AccountId) -> Result<()> {
        match self.call_upstream(self.accounts.get_account(account_id)).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(OrderError::AccountNotFound {
                account_id: account_id.clone(),
                cause: None,
            }),
            Err(cause) => Err(OrderError::AccountNotFound {
                account_id: account_id.clone(),
                cause: Some(cause),
            }),
        }
    }

    /// Returns every order of an account with current product metadata.
    ///
    /// Orders come back in ascending order-id order and line items in
    /// insertion order. The catalog is asked once for all distinct product
    /// ids across the orders, and not at all when there are none. Totals are
    /// the stored ones.
    #[tracing::instrument(skip(self), fields(account_id = %account_id))]
    pub async fn get_orders_for_account(&self, account_id: &AccountId) -> Result<Vec<Order>> {
        let result = self.load_orders(account_id).await;

        match &result {
            Ok(orders) => {
                metrics::counter!("order_retrievals_total").increment(1);
                tracing::debug!(orders = orders.len(), "orders retrieved");
            }
            Err(e) => {
                metrics::counter!("order_retrieval_failures_total", "reason" => e.kind())
                    .increment(1);
                tracing::warn!(error = %e, reason = e.kind(), "order retrieval failed");
            }
        }
        result
    }

    async fn load_orders(&self, account_id: &AccountId) -> Result<Vec<Order>> {
        let records = self
            .call_store(self.repository.get_orders_for_account(account_id))
            .await
            .map_err(OrderError::RetrievalError)?;

        let product_ids = distinct_product_ids(&records);
        if product_ids.is_empty() {
            return Ok(hydrate_orders(records, &[]));
        }

        let products = self
            .call_upstream(self.catalog.get_products_by_ids(&product_ids))
            .await
            .map_err(OrderError::ProductLookupFailed)?;

        Ok(hydrate_orders(records, &products))
    }

    async fn call_upstream<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, ClientError>>,
    ) -> std::result::Result<T, UpstreamError> {
        let deadline = self.config.remote_timeout;
        match tokio::time::timeout(deadline, call).await {
            Ok(result) => result.map_err(UpstreamError::from),
            Err(_) => Err(UpstreamError::Timeout(deadline)),
        }
    }

    async fn call_store<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, StoreError>>,
    ) -> std::result::Result<T, StorageError> {
        let deadline = self.config.remote_timeout;
        match tokio::time::timeout(deadline, call).await {
            Ok(result) => result.map_err(StorageError::from),
            Err(_) => Err(StorageError::Timeout(deadline)),
        }
    }
}
