use crate::models::CustomerPayment;
use crate::repository::{OrderRepository, PaymentRepository};
use chrono::Utc;
use procura_shared::events::PaymentRecordedEvent;
use procura_shared::{Actor, Masked};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Append-only payment ledger per order. Balances are derived from the
/// full payment history on every read, never cached, so concurrent
/// appends cannot drift a running total.
pub struct PaymentLedger {
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl PaymentLedger {
    pub fn new(orders: Arc<dyn OrderRepository>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { orders, payments }
    }

    pub async fn record_payment(
        &self,
        order_id: Uuid,
        amount: Decimal,
        payment_method: &str,
        note: Option<String>,
        actor: &Actor,
    ) -> Result<CustomerPayment, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.orders
            .get_order(order_id)
            .await
            .map_err(storage)?
            .ok_or(LedgerError::OrderNotFound(order_id))?;

        let payment = CustomerPayment::new(
            order_id,
            amount,
            payment_method.to_string(),
            note,
            actor.user_id,
        );
        self.payments.record(&payment).await.map_err(storage)?;

        let event = PaymentRecordedEvent {
            payment_id: payment.id,
            order_id,
            amount,
            payment_method: payment.payment_method.clone(),
            note: payment.note.clone().map(Masked::new),
            timestamp: Utc::now().timestamp(),
        };
        tracing::info!(?event, "customer payment recorded");

        Ok(payment)
    }

    /// `total_sell − Σ payments`, recomputed from history. Negative
    /// means overpayment, which is reported rather than rejected.
    pub async fn remaining_balance(&self, order_id: Uuid) -> Result<Decimal, LedgerError> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(storage)?
            .ok_or(LedgerError::OrderNotFound(order_id))?;
        let paid = self
            .payments
            .list_for_order(order_id)
            .await
            .map_err(storage)?
            .iter()
            .fold(Decimal::ZERO, |acc, payment| acc + payment.amount);
        Ok(order.total_sell - paid)
    }
}

fn storage(e: Box<dyn std::error::Error + Send + Sync>) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::Order;

    fn ledger_with_order(total_sell: Decimal) -> (PaymentLedger, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let order = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Decimal::ZERO,
            total_sell,
        );
        let order_id = order.id;
        store.insert_order(order);
        (PaymentLedger::new(store.clone(), store), order_id)
    }

    #[tokio::test]
    async fn balance_is_total_sell_minus_payments() {
        let (ledger, order_id) = ledger_with_order(Decimal::from(100));
        let actor = Actor::admin(Uuid::new_v4());

        ledger
            .record_payment(order_id, Decimal::from(30), "cash", None, &actor)
            .await
            .unwrap();
        ledger
            .record_payment(
                order_id,
                Decimal::from(20),
                "bank_transfer",
                Some("wire ref 991".to_string()),
                &actor,
            )
            .await
            .unwrap();

        assert_eq!(
            ledger.remaining_balance(order_id).await.unwrap(),
            Decimal::from(50)
        );
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let (ledger, order_id) = ledger_with_order(Decimal::from(100));
        let actor = Actor::admin(Uuid::new_v4());

        let err = ledger
            .record_payment(order_id, Decimal::from(-5), "cash", None, &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));

        let err = ledger
            .record_payment(order_id, Decimal::ZERO, "cash", None, &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));

        // Nothing was written.
        assert_eq!(
            ledger.remaining_balance(order_id).await.unwrap(),
            Decimal::from(100)
        );
    }

    #[tokio::test]
    async fn overpayment_reports_negative_balance() {
        let (ledger, order_id) = ledger_with_order(Decimal::from(40));
        let actor = Actor::admin(Uuid::new_v4());

        ledger
            .record_payment(order_id, Decimal::from(60), "cash", None, &actor)
            .await
            .unwrap();
        assert_eq!(
            ledger.remaining_balance(order_id).await.unwrap(),
            Decimal::from(-20)
        );
    }

    #[tokio::test]
    async fn unknown_order_is_rejected() {
        let (ledger, _) = ledger_with_order(Decimal::from(10));
        let missing = Uuid::new_v4();

        let err = ledger
            .record_payment(missing, Decimal::from(5), "cash", None, &Actor::admin(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::OrderNotFound(_)));
        assert!(matches!(
            ledger.remaining_balance(missing).await.unwrap_err(),
            LedgerError::OrderNotFound(_)
        ));
    }
}
