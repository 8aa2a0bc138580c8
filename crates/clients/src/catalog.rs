//! Catalog service trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ClientError, Result};

/// Authoritative product metadata from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

/// Trait for product catalog lookups.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Resolves a batch of product IDs in one call.
    ///
    /// Unknown IDs are omitted from the result rather than reported as
    /// errors; an `Err` means the lookup itself failed.
    async fn get_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: Vec<Product>,
    fail: bool,
    delay: Option<Duration>,
    requests: Vec<Vec<ProductId>>,
}

/// In-memory catalog service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryCatalogService {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product, replacing any product with the same ID.
    pub async fn upsert_product(&self, product: Product) {
        let mut state = self.state.write().await;
        match state.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => state.products.push(product),
        }
    }

    /// Withdraws a product from the catalog.
    pub async fn remove_product(&self, id: &ProductId) {
        self.state.write().await.products.retain(|p| &p.id != id);
    }

    /// Configures the service to fail subsequent lookups.
    pub async fn set_fail(&self, fail: bool) {
        self.state.write().await.fail = fail;
    }

    /// Makes every lookup wait before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.state.write().await.delay = delay;
    }

    /// Returns the number of lookups received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the ID batches received, oldest first.
    pub async fn requests(&self) -> Vec<Vec<ProductId>> {
        self.state.read().await.requests.clone()
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state.write().await.requests.push(ids.to_vec());

        let delay = self.state.read().await.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().await;
        if state.fail {
            return Err(ClientError::Unavailable("catalog offline".to_string()));
        }

        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| state.products.iter().find(|p| &p.id == id).cloned())
            .collect())
    }
}
