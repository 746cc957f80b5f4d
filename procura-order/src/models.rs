use chrono::{DateTime, Utc};
use procura_quote::{ResolvedQuoteItem, SupplierGroup};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order lifecycle. The set is closed: free-form status strings from
/// callers are rejected at the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Shipping,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Shipping => write!(f, "shipping"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "shipping" => Ok(OrderStatus::Shipping),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// A single-supplier fulfillment unit materialized from an accepted
/// quote. A quote spanning n suppliers yields n of these; an order
/// never mixes suppliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub customer_id: Uuid,
    pub supplier_id: Uuid,
    pub total_cost: Decimal,
    pub total_sell: Decimal,
    pub profit: Decimal,
    pub status: OrderStatus,
    pub tracking_code: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        quote_id: Uuid,
        customer_id: Uuid,
        supplier_id: Uuid,
        total_cost: Decimal,
        total_sell: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            quote_id,
            customer_id,
            supplier_id,
            total_cost,
            total_sell,
            profit: total_sell - total_cost,
            status: OrderStatus::Pending,
            tracking_code: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// An order line with cost and sell prices snapshotted at acceptance
/// time. Later catalog price changes never touch these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_supplier_id: Uuid,
    pub quantity: i32,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    pub subtotal: Decimal,
}

impl OrderItem {
    pub fn from_resolved(order_id: Uuid, resolved: &ResolvedQuoteItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_supplier_id: resolved.item.product_supplier_id,
            quantity: resolved.item.quantity,
            cost_price: resolved.cost_price,
            sell_price: resolved.item.quoted_price,
            subtotal: resolved.item.subtotal,
        }
    }
}

/// One order with its items, as built by the materializer before the
/// store commits the whole acceptance.
#[derive(Debug, Clone)]
pub struct MaterializedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl MaterializedOrder {
    pub fn from_group(quote_id: Uuid, customer_id: Uuid, group: &SupplierGroup) -> Self {
        let order = Order::new(
            quote_id,
            customer_id,
            group.supplier_id,
            group.total_cost,
            group.total_sell,
        );
        let items = group
            .items
            .iter()
            .map(|resolved| OrderItem::from_resolved(order.id, resolved))
            .collect();
        Self { order, items }
    }
}

/// Everything a quote acceptance writes: the orders, their items, and
/// the quote/request status flips, committed as one unit.
#[derive(Debug, Clone)]
pub struct QuoteAcceptance {
    pub quote_id: Uuid,
    pub request_id: Uuid,
    pub orders: Vec<MaterializedOrder>,
}

/// A customer payment recorded against one order. Append-only; balances
/// are always recomputed from the full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPayment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub note: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CustomerPayment {
    pub fn new(
        order_id: Uuid,
        amount: Decimal,
        payment_method: String,
        note: Option<String>,
        created_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            amount,
            payment_method,
            note,
            created_by,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_profit_is_sell_minus_cost() {
        let order = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Decimal::from(30),
            Decimal::from(45),
        );
        assert_eq!(order.profit, Decimal::from(15));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.completed_at.is_none());
    }

    #[test]
    fn status_parse_is_strict() {
        assert_eq!("shipping".parse::<OrderStatus>().unwrap(), OrderStatus::Shipping);
        assert!("delivered".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipping.is_terminal());
    }
}
