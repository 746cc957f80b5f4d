use crate::models::{QuoteItem, ResolvedQuoteItem};
use procura_catalog::ProductSupplier;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One supplier's slice of a quote: the items sourced from that
/// supplier and the cost/sell/profit subtotals for them.
#[derive(Debug, Clone)]
pub struct SupplierGroup {
    pub supplier_id: Uuid,
    pub items: Vec<ResolvedQuoteItem>,
    pub total_cost: Decimal,
    pub total_sell: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, thiserror::Error)]
#[error("quote item {quote_item_id} references missing product supplier {product_supplier_id}")]
pub struct ResolutionError {
    pub quote_item_id: Uuid,
    pub product_supplier_id: Uuid,
}

/// Attaches each item's product-supplier link. All-or-nothing: a single
/// unresolvable link fails the whole quote, so no order is ever built
/// from a partially resolved item set.
pub fn resolve_items(
    rows: Vec<(QuoteItem, Option<ProductSupplier>)>,
) -> Result<Vec<ResolvedQuoteItem>, ResolutionError> {
    rows.into_iter()
        .map(|(item, link)| match link {
            Some(link) => Ok(ResolvedQuoteItem {
                supplier_id: link.supplier_id,
                cost_price: link.cost_price,
                item,
            }),
            None => Err(ResolutionError {
                quote_item_id: item.id,
                product_supplier_id: item.product_supplier_id,
            }),
        })
        .collect()
}

/// Partitions resolved items by supplier. Groups appear in first
/// -occurrence order of their supplier, so iteration is deterministic.
pub fn group_by_supplier(items: Vec<ResolvedQuoteItem>) -> Vec<SupplierGroup> {
    let mut groups: Vec<SupplierGroup> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.supplier_id == item.supplier_id) {
            Some(group) => group.items.push(item),
            None => groups.push(SupplierGroup {
                supplier_id: item.supplier_id,
                items: vec![item],
                total_cost: Decimal::ZERO,
                total_sell: Decimal::ZERO,
                profit: Decimal::ZERO,
            }),
        }
    }
    for group in &mut groups {
        group.total_cost = group.items.iter().map(ResolvedQuoteItem::cost_total).sum();
        group.total_sell = group.items.iter().map(ResolvedQuoteItem::sell_total).sum();
        group.profit = group.total_sell - group.total_cost;
    }
    groups
}
