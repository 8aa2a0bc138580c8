//! Account service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::AccountId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ClientError, Result};

/// An account as returned by the account directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
}

/// Trait for account directory lookups.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Fetches an account by ID.
    ///
    /// Returns `Ok(None)` when the directory does not know the account.
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>>;
}

#[derive(Debug, Default)]
struct InMemoryAccountState {
    accounts: HashMap<AccountId, Account>,
    fail: bool,
    delay: Option<Duration>,
}

/// In-memory account service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountService {
    state: Arc<RwLock<InMemoryAccountState>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryAccountService {
    /// Creates a new in-memory account service with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account.
    pub async fn add_account(&self, id: impl Into<AccountId>, name: impl Into<String>) {
        let id = id.into();
        let account = Account {
            id: id.clone(),
            name: name.into(),
        };
        self.state.write().await.accounts.insert(id, account);
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
}

#[async_trait]
impl AccountService for InMemoryAccountService {
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.state.read().await.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().await;
        if state.fail {
            return Err(ClientError::Unavailable(
                "account directory offline".to_string(),
            ));
        }

        Ok(state.accounts.get(account_id).cloned())
    }
}
