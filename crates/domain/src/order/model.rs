//! Hydrated order model.

use chrono::{DateTime, SubsecRound, Utc};
use clients::Product;
use common::{AccountId, Money, OrderId, ProductId};
use order_store::{LineRecord, OrderRecord};

use crate::error::{OrderError, Result};

/// A line item with its product metadata.
///
/// Metadata comes from the catalog: at creation it is the snapshot the
/// total was computed from, on later reads it is the catalog's current
/// state. Products the catalog no longer knows keep empty metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: u32,
}

impl OrderedProduct {
    /// Combines catalog metadata with a quantity.
    pub fn from_catalog(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity,
        }
    }

    /// A line item whose product could not be resolved.
    pub fn unresolved(id: ProductId, quantity: u32) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            price: Money::zero(),
            quantity,
        }
    }

    /// Returns price * quantity, or `None` if it does not fit in `Money`.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_multiply(self.quantity)
    }
}

/// An order as returned to callers: an immutable snapshot.
///
/// The total is computed once when the order is placed and carried
/// unchanged afterwards, even when catalog prices move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    created_at: DateTime<Utc>,
    account_id: AccountId,
    total_price: Money,
    products: Vec<OrderedProduct>,
}

impl Order {
    /// Places a new order: assigns an ID and timestamp and freezes the total.
    ///
    /// The timestamp is truncated to microseconds, the precision the store
    /// keeps, so a stored order reads back equal. Fails with
    /// [`OrderError::PriceOverflow`] if a line total or the order total does
    /// not fit in `Money`.
    pub fn place(account_id: AccountId, products: Vec<OrderedProduct>) -> Result<Self> {
        let total_price = products
            .iter()
            .map(OrderedProduct::line_total)
            .collect::<Option<Vec<_>>>()
            .and_then(Money::checked_sum);

        let Some(total_price) = total_price else {
            return Err(OrderError::PriceOverflow { account_id });
        };

        Ok(Self {
            id: OrderId::new(),
            created_at: Utc::now().trunc_subsecs(6),
            account_id,
            total_price,
            products,
        })
    }

    /// Rebuilds an order from a stored record's header and already hydrated
    /// line items. The record's own lines are not consulted.
    pub(crate) fn from_stored(record: OrderRecord, products: Vec<OrderedProduct>) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            account_id: record.account_id,
            total_price: record.total_price,
            products,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Line items in insertion order.
    pub fn products(&self) -> &[OrderedProduct] {
        &self.products
    }

    pub fn item_count(&self) -> usize {
        self.products.len()
    }

    /// The persisted form: header plus (product id, quantity) pairs.
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            created_at: self.created_at,
            account_id: self.account_id.clone(),
            total_price: self.total_price,
            lines: self
                .products
                .iter()
                .map(|p| LineRecord::new(p.id.clone(), p.quantity))
                .collect(),
        }
    }
}
