use chrono::{DateTime, Utc};

use crate::{AccountId, Money, OrderId, ProductId};

/// The persisted form of a line item: product id and quantity only.
///
/// Name, description and price are not stored; they are recovered from the
/// catalog when orders are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineRecord {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// The persisted form of an order: header fields plus line items in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub account_id: AccountId,
    /// Total frozen at creation time.
    pub total_price: Money,
    pub lines: Vec<LineRecord>,
}

impl OrderRecord {
    /// Flattens the record into the rows a joined read would produce.
    ///
    /// An order without line items yields a single header-only row.
    pub fn to_rows(&self) -> Vec<OrderRow> {
        if self.lines.is_empty() {
            return vec![self.row(None)];
        }
        self.lines
            .iter()
            .map(|line| self.row(Some(line.clone())))
            .collect()
    }

    fn row(&self, line: Option<LineRecord>) -> OrderRow {
        OrderRow {
            order_id: self.id,
            created_at: self.created_at,
            account_id: self.account_id.clone(),
            total_price: self.total_price,
            line,
        }
    }
}

/// One row of the header-to-line-items join.
///
/// `line` is `None` for a header that has no line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub order_id: OrderId,
    pub created_at: DateTime<Utc>,
    pub account_id: AccountId,
    pub total_price: Money,
    pub line: Option<LineRecord>,
}
