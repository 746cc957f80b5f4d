use crate::models::{MaterializedOrder, Order, QuoteAcceptance};
use crate::repository::{AcceptanceCommit, OrderRepository};
use chrono::Utc;
use procura_quote::{
    group_by_supplier, resolve_items, QuoteRepository, QuoteStatus, RequestRepository,
    ResolutionError,
};
use procura_shared::events::QuoteAcceptedEvent;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AcceptanceError {
    #[error("quote not found: {0}")]
    QuoteNotFound(Uuid),

    #[error("quote {0} is already accepted")]
    AlreadyAccepted(Uuid),

    #[error("quote {0} has no items")]
    EmptyQuote(Uuid),

    #[error("request not found: {0}")]
    RequestNotFound(Uuid),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("quote {0} was accepted concurrently")]
    Conflict(Uuid),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Turns an accepted quote into per-supplier orders. All computation
/// happens up front; persistence is a single transactional repository
/// call, so a failure anywhere leaves quote, request, and orders
/// untouched.
pub struct OrderMaterializer {
    quotes: Arc<dyn QuoteRepository>,
    requests: Arc<dyn RequestRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderMaterializer {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        requests: Arc<dyn RequestRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            quotes,
            requests,
            orders,
        }
    }

    /// Accept `quote_id` and materialize one order per distinct
    /// supplier in the quote. Returns the created orders in supplier
    /// first-occurrence order.
    pub async fn accept_quote(&self, quote_id: Uuid) -> Result<Vec<Order>, AcceptanceError> {
        let quote = self
            .quotes
            .get_quote(quote_id)
            .await
            .map_err(storage)?
            .ok_or(AcceptanceError::QuoteNotFound(quote_id))?;
        if quote.status != QuoteStatus::Sent {
            return Err(AcceptanceError::AlreadyAccepted(quote_id));
        }

        let request = self
            .requests
            .get_request(quote.request_id)
            .await
            .map_err(storage)?
            .ok_or(AcceptanceError::RequestNotFound(quote.request_id))?;

        let rows = self
            .quotes
            .list_items_with_links(quote_id)
            .await
            .map_err(storage)?;
        if rows.is_empty() {
            return Err(AcceptanceError::EmptyQuote(quote_id));
        }

        let resolved = resolve_items(rows)?;
        let groups = group_by_supplier(resolved);

        let acceptance = QuoteAcceptance {
            quote_id,
            request_id: request.id,
            orders: groups
                .iter()
                .map(|group| MaterializedOrder::from_group(quote_id, request.customer_id, group))
                .collect(),
        };

        match self
            .orders
            .commit_acceptance(&acceptance)
            .await
            .map_err(storage)?
        {
            AcceptanceCommit::Committed => {}
            AcceptanceCommit::LostRace => return Err(AcceptanceError::Conflict(quote_id)),
        }

        let event = QuoteAcceptedEvent {
            quote_id,
            request_id: request.id,
            customer_id: request.customer_id,
            orders_created: acceptance.orders.len(),
            timestamp: Utc::now().timestamp(),
        };
        tracing::info!(?event, "quote accepted, supplier orders materialized");

        Ok(acceptance
            .orders
            .into_iter()
            .map(|materialized| materialized.order)
            .collect())
    }
}

fn storage(e: Box<dyn std::error::Error + Send + Sync>) -> AcceptanceError {
    AcceptanceError::Storage(e.to_string())
}
