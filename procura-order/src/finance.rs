use crate::models::OrderStatus;
use crate::repository::{OrderRepository, PaymentRepository};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Platform-wide revenue, profit, and customer debt figures.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    /// Sum of `total_sell` over completed orders.
    pub total_revenue: Decimal,
    /// Sum of `profit` over completed orders.
    pub total_profit: Decimal,
    /// Sum of `total_sell − payments` over all orders, completed or not.
    pub total_outstanding: Decimal,
    pub completed_orders: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Aggregates order and payment history into the operator's numbers.
pub struct FinancialReporter {
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl FinancialReporter {
    pub fn new(orders: Arc<dyn OrderRepository>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { orders, payments }
    }

    pub async fn summarize(&self) -> Result<FinancialSummary, FinanceError> {
        let orders = self.orders.list_orders().await.map_err(storage)?;
        let payments = self.payments.list_all().await.map_err(storage)?;

        let mut paid_by_order: HashMap<Uuid, Decimal> = HashMap::new();
        for payment in &payments {
            *paid_by_order.entry(payment.order_id).or_default() += payment.amount;
        }

        let mut summary = FinancialSummary {
            total_revenue: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            total_outstanding: Decimal::ZERO,
            completed_orders: 0,
        };
        for order in &orders {
            if order.status == OrderStatus::Completed {
                summary.total_revenue += order.total_sell;
                summary.total_profit += order.profit;
                summary.completed_orders += 1;
            }
            let paid = paid_by_order
                .get(&order.id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            summary.total_outstanding += order.total_sell - paid;
        }
        Ok(summary)
    }
}

fn storage(e: Box<dyn std::error::Error + Send + Sync>) -> FinanceError {
    FinanceError::Storage(e.to_string())
}
