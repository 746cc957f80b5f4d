use crate::models::{CustomerPayment, Order, OrderItem, OrderStatus, QuoteAcceptance};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Outcome of the transactional acceptance commit. `LostRace` means the
/// quote's compare-and-set on `sent` matched zero rows: some other call
/// accepted it first and nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceCommit {
    Committed,
    LostRace,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Commit a quote acceptance atomically: every order and item in
    /// `acceptance`, plus the quote and request status flips. Either
    /// all of it becomes visible or none of it does.
    async fn commit_acceptance(
        &self,
        acceptance: &QuoteAcceptance,
    ) -> Result<AcceptanceCommit, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Patch status and the completion timestamp together so the two
    /// never disagree.
    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Set the tracking code and force the order onto `shipping` in one
    /// write.
    async fn set_tracking(
        &self,
        id: Uuid,
        tracking_code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn record(
        &self,
        payment: &CustomerPayment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<CustomerPayment>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_all(
        &self,
    ) -> Result<Vec<CustomerPayment>, Box<dyn std::error::Error + Send + Sync>>;
}
