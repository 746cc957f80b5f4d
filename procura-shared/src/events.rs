use crate::pii::Masked;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted once per successful quote acceptance, after the supplier
/// orders have been committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteAcceptedEvent {
    pub quote_id: Uuid,
    pub request_id: Uuid,
    pub customer_id: Uuid,
    pub orders_created: usize,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecordedEvent {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub note: Option<Masked<String>>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order_id: Uuid,
    pub from: String,
    pub to: String,
    pub timestamp: i64,
}
