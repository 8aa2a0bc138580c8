//! Grouping of flat join rows into nested order records.

use crate::record::{OrderRecord, OrderRow};

/// Groups a flat row sequence into order records in a single linear pass.
///
/// Rows belonging to the same order must be contiguous; the store read
/// guarantees this by ordering on order id. Output order is the order in
/// which each run of rows first appears, and each record's lines keep the
/// row order. Header-only rows (no line item) produce an order with no
/// lines rather than a phantom line.
///
/// If a row for an order reappears after another order's run, it starts a
/// second record; callers relying on this function must keep the ordering
/// guarantee.
pub fn group_rows<I>(rows: I) -> Vec<OrderRecord>
where
    I: IntoIterator<Item = OrderRow>,
{
    let mut orders: Vec<OrderRecord> = Vec::new();

    for row in rows {
        let OrderRow {
            order_id,
            created_at,
            account_id,
            total_price,
            line,
        } = row;

        if orders.last().is_none_or(|current| current.id != order_id) {
            orders.push(OrderRecord {
                id: order_id,
                created_at,
                account_id,
                total_price,
                lines: Vec::new(),
            });
        }

        if let (Some(line), Some(current)) = (line, orders.last_mut()) {
            current.lines.push(line);
        }
    }

    orders
}
