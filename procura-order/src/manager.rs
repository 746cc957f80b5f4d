use crate::models::{Order, OrderStatus};
use crate::repository::OrderRepository;
use chrono::Utc;
use procura_shared::events::OrderStatusChangedEvent;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("cannot set tracking on a {0} order")]
    InvalidTransition(OrderStatus),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Admin-facing status and tracking updates for orders.
pub struct OrderStatusManager {
    orders: Arc<dyn OrderRepository>,
}

impl OrderStatusManager {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Set the order status directly. Entering `completed` stamps
    /// `completed_at`; setting `completed` again refreshes the stamp
    /// without error. Any other status clears the stamp so it never
    /// describes a non-completed order.
    pub async fn set_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, StatusError> {
        let mut order = self.load(order_id).await?;

        let completed_at = match status {
            OrderStatus::Completed => Some(Utc::now()),
            _ => None,
        };
        self.orders
            .update_status(order_id, status, completed_at)
            .await
            .map_err(storage)?;

        let event = OrderStatusChangedEvent {
            order_id,
            from: order.status.to_string(),
            to: status.to_string(),
            timestamp: Utc::now().timestamp(),
        };
        tracing::info!(?event, "order status updated");

        order.status = status;
        order.completed_at = completed_at;
        Ok(order)
    }

    /// Record the shipment tracking code and move the order onto
    /// `shipping`. Terminal orders are not reopened this way.
    pub async fn set_tracking(
        &self,
        order_id: Uuid,
        tracking_code: &str,
    ) -> Result<Order, StatusError> {
        let mut order = self.load(order_id).await?;
        if order.status.is_terminal() {
            return Err(StatusError::InvalidTransition(order.status));
        }

        self.orders
            .set_tracking(order_id, tracking_code)
            .await
            .map_err(storage)?;
        tracing::info!(
            order_id = %order_id,
            tracking_code = %tracking_code,
            "tracking code set, order shipping"
        );

        order.tracking_code = Some(tracking_code.to_string());
        order.status = OrderStatus::Shipping;
        Ok(order)
    }

    async fn load(&self, order_id: Uuid) -> Result<Order, StatusError> {
        self.orders
            .get_order(order_id)
            .await
            .map_err(storage)?
            .ok_or(StatusError::OrderNotFound(order_id))
    }
}

fn storage(e: Box<dyn std::error::Error + Send + Sync>) -> StatusError {
    StatusError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use rust_decimal::Decimal;

    fn manager_with_order() -> (OrderStatusManager, Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let order = Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Decimal::from(10),
            Decimal::from(15),
        );
        let order_id = order.id;
        store.insert_order(order);
        (OrderStatusManager::new(store.clone()), store, order_id)
    }

    #[tokio::test]
    async fn completing_stamps_completed_at() {
        let (manager, store, order_id) = manager_with_order();

        let order = manager
            .set_status(order_id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.completed_at.is_some());

        // Idempotent re-completion refreshes the stamp without error.
        let again = manager
            .set_status(order_id, OrderStatus::Completed)
            .await
            .unwrap();
        assert!(again.completed_at.is_some());

        let stored = store.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn leaving_completed_clears_the_stamp() {
        let (manager, store, order_id) = manager_with_order();

        manager
            .set_status(order_id, OrderStatus::Completed)
            .await
            .unwrap();
        manager
            .set_status(order_id, OrderStatus::Pending)
            .await
            .unwrap();

        let stored = store.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert!(stored.completed_at.is_none());
    }

    #[tokio::test]
    async fn tracking_forces_shipping() {
        let (manager, store, order_id) = manager_with_order();

        let order = manager.set_tracking(order_id, "GHN-12345").await.unwrap();
        assert_eq!(order.status, OrderStatus::Shipping);
        assert_eq!(order.tracking_code.as_deref(), Some("GHN-12345"));

        let stored = store.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Shipping);
    }

    #[tokio::test]
    async fn tracking_is_rejected_on_terminal_orders() {
        let (manager, _, order_id) = manager_with_order();

        manager
            .set_status(order_id, OrderStatus::Cancelled)
            .await
            .unwrap();
        let err = manager.set_tracking(order_id, "GHN-99").await.unwrap_err();
        assert!(matches!(
            err,
            StatusError::InvalidTransition(OrderStatus::Cancelled)
        ));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (manager, _, _) = manager_with_order();
        let err = manager
            .set_status(Uuid::new_v4(), OrderStatus::Shipping)
            .await
            .unwrap_err();
        assert!(matches!(err, StatusError::OrderNotFound(_)));
    }
}
