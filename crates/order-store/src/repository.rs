use async_trait::async_trait;

use crate::{AccountId, OrderRecord, OrderRow, Result, StoreError, group_rows};

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists an order header and all of its line items.
    ///
    /// The write is atomic: either the header and every line item become
    /// visible, or nothing does.
    async fn create_order(&self, order: &OrderRecord) -> Result<()>;

    /// Returns the joined header/line-item rows for an account.
    ///
    /// Rows are ordered by order id, then by line-item insertion order, so
    /// all rows of one order are contiguous. An account without orders
    /// yields an empty vector.
    async fn get_order_rows_for_account(&self, account_id: &AccountId) -> Result<Vec<OrderRow>>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<()>;
}

/// Extension trait providing convenience methods for order repositories.
#[async_trait]
pub trait OrderRepositoryExt: OrderRepository {
    /// Loads every order of an account, grouped into records.
    async fn get_orders_for_account(&self, account_id: &AccountId) -> Result<Vec<OrderRecord>> {
        let rows = self.get_order_rows_for_account(account_id).await?;
        Ok(group_rows(rows))
    }
}

// Blanket implementation for all OrderRepository implementations
impl<T: OrderRepository + ?Sized> OrderRepositoryExt for T {}

/// Validates an order before it is written.
///
/// Quantities must be strictly positive and fit the storage column, and the
/// total may not be negative.
pub fn validate_record(order: &OrderRecord) -> Result<()> {
    if order.total_price.is_negative() {
        return Err(StoreError::InvalidRecord(format!(
            "order {} has negative total {}",
            order.id, order.total_price
        )));
    }

    if i32::try_from(order.lines.len()).is_err() {
        return Err(StoreError::InvalidRecord(format!(
            "order {} has too many line items ({})",
            order.id,
            order.lines.len()
        )));
    }

    for line in &order.lines {
        if line.quantity == 0 || i32::try_from(line.quantity).is_err() {
            return Err(StoreError::InvalidRecord(format!(
                "order {} has invalid quantity {} for product {}",
                order.id, line.quantity, line.product_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{LineRecord, Money, OrderId};

    fn record(lines: Vec<LineRecord>, total_cents: i64) -> OrderRecord {
        OrderRecord {
            id: OrderId::new(),
            created_at: Utc::now(),
            account_id: AccountId::new("A1"),
            total_price: Money::from_cents(total_cents),
            lines,
        }
    }

    #[test]
    fn valid_record_passes() {
        let order = record(vec![LineRecord::new("P1", 1)], 100);
        assert!(validate_record(&order).is_ok());
    }

    #[test]
    fn record_without_lines_passes() {
        assert!(validate_record(&record(vec![], 0)).is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let order = record(vec![LineRecord::new("P1", 1), LineRecord::new("P2", 0)], 100);
        assert!(matches!(
            validate_record(&order),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn quantity_beyond_column_range_is_rejected() {
        let order = record(vec![LineRecord::new("P1", u32::MAX)], 100);
        assert!(validate_record(&order).is_err());
    }

    #[test]
    fn negative_total_is_rejected() {
        let order = record(vec![LineRecord::new("P1", 1)], -1);
        assert!(validate_record(&order).is_err());
    }
}
