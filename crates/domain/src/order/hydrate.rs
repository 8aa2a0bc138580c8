//! Product hydration: merging current catalog metadata into stored line items.

use std::collections::{HashMap, HashSet};

use clients::Product;
use common::ProductId;
use order_store::OrderRecord;

use super::model::{Order, OrderedProduct};

/// Distinct product IDs referenced by any line item, in order of first
/// appearance across the records.
pub fn distinct_product_ids(records: &[OrderRecord]) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|record| record.lines.iter())
        .filter(|line| seen.insert(&line.product_id))
        .map(|line| line.product_id.clone())
        .collect()
}

/// Hydrates stored orders with catalog metadata.
///
/// Matched line items take the catalog's current name, description and
/// price. Unmatched ones are kept with empty metadata. Lines with a zero
/// quantity are dropped. Order totals are the stored ones and are never
/// recomputed, and line-item order is preserved.
pub fn hydrate_orders(records: Vec<OrderRecord>, products: &[Product]) -> Vec<Order> {
    let catalog: HashMap<&ProductId, &Product> = products.iter().map(|p| (&p.id, p)).collect();

    records
        .into_iter()
        .map(|record| {
            let items = record
                .lines
                .iter()
                .filter(|line| line.quantity > 0)
                .map(|line| match catalog.get(&line.product_id) {
                    Some(product) => OrderedProduct::from_catalog(product, line.quantity),
                    None => OrderedProduct::unresolved(line.product_id.clone(), line.quantity),
                })
                .collect();
            Order::from_stored(record, items)
        })
        .collect()
}
