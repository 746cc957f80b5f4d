use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Sent,
    Accepted,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteStatus::Sent => write!(f, "sent"),
            QuoteStatus::Accepted => write!(f, "accepted"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown quote status: {0}")]
pub struct UnknownQuoteStatus(pub String);

impl FromStr for QuoteStatus {
    type Err = UnknownQuoteStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(QuoteStatus::Sent),
            "accepted" => Ok(QuoteStatus::Accepted),
            other => Err(UnknownQuoteStatus(other.to_string())),
        }
    }
}

/// An admin's priced response to a customer request. Items live in
/// their own records; `total_amount` must always equal the sum of the
/// item subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub request_id: Uuid,
    pub admin_id: Uuid,
    pub status: QuoteStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(request_id: Uuid, admin_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            admin_id,
            status: QuoteStatus::Sent,
            total_amount: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Fold an item's subtotal into the quote total.
    pub fn add_item(&mut self, item: &QuoteItem) {
        self.total_amount += item.subtotal;
    }
}

/// One priced line of a quote. The product-supplier link pins both the
/// product and the supplier it will be sourced from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub product_supplier_id: Uuid,
    pub quantity: i32,
    pub quoted_price: Decimal,
    pub subtotal: Decimal,
}

impl QuoteItem {
    /// Builds a line with `subtotal = quantity × quoted_price`; the
    /// subtotal is never stored independently of its factors.
    pub fn new(quote_id: Uuid, product_supplier_id: Uuid, quantity: i32, quoted_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            quote_id,
            product_supplier_id,
            quantity,
            quoted_price,
            subtotal: Decimal::from(quantity) * quoted_price,
        }
    }
}

/// A quote item with its product-supplier link expanded, exposing the
/// supplier it resolves to and the cost price at acceptance time.
#[derive(Debug, Clone)]
pub struct ResolvedQuoteItem {
    pub item: QuoteItem,
    pub supplier_id: Uuid,
    pub cost_price: Decimal,
}

impl ResolvedQuoteItem {
    pub fn cost_total(&self) -> Decimal {
        Decimal::from(self.item.quantity) * self.cost_price
    }

    pub fn sell_total(&self) -> Decimal {
        self.item.subtotal
    }
}
