//! Order commands.

use std::collections::{HashMap, HashSet};

use common::{AccountId, ProductId};

use crate::error::OrderError;

/// A (product, quantity) pair as requested by a client.
///
/// The quantity is taken as sent; [`CreateOrder::validate`] checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl RequestedItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The account placing the order.
    pub account_id: AccountId,

    /// Requested items, in client order.
    pub items: Vec<RequestedItem>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command.
    pub fn new(account_id: impl Into<AccountId>, items: Vec<RequestedItem>) -> Self {
        Self {
            account_id: account_id.into(),
            items,
        }
    }

    /// Adds a requested item.
    pub fn with_item(mut self, product_id: impl Into<ProductId>, quantity: i64) -> Self {
        self.items.push(RequestedItem::new(product_id, quantity));
        self
    }

    /// Rejects the command if any quantity is zero, negative or beyond `u32`.
    pub fn validate(&self) -> Result<(), OrderError> {
        let invalid = |item: &&RequestedItem| {
            item.quantity == 0 || u32::try_from(item.quantity).is_err()
        };
        match self.items.iter().find(invalid) {
            Some(item) => Err(OrderError::InvalidQuantity {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            }),
            None => Ok(()),
        }
    }

    /// Distinct requested product IDs, in order of first appearance.
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter(|item| seen.insert(&item.product_id))
            .map(|item| item.product_id.clone())
            .collect()
    }

    /// Requested quantity per product. A repeated product keeps its last
    /// quantity. Quantities outside `u32` are skipped.
    pub fn quantities(&self) -> HashMap<&ProductId, u32> {
        self.items
            .iter()
            .filter_map(|item| Some((&item.product_id, u32::try_from(item.quantity).ok()?)))
            .collect()
    }
}
