use crate::models::{Quote, QuoteItem};
use crate::repository::{QuoteRepository, RequestRepository};
use crate::request::RequestStatus;
use procura_catalog::CatalogRepository;
use procura_shared::Actor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One priced line an admin selected while quoting: which supplier link
/// to source the product from, how many, and at what sell price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub product_id: Uuid,
    pub product_supplier_id: Uuid,
    pub quantity: i32,
    pub quoted_price: Decimal,
}

/// A fully built quote ready for persistence or inspection.
#[derive(Debug, Clone)]
pub struct QuoteDraft {
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("only admins can issue quotes")]
    Forbidden,

    #[error("request not found: {0}")]
    RequestNotFound(Uuid),

    #[error("request {0} is already accepted")]
    RequestAlreadyAccepted(Uuid),

    #[error("a quote needs at least one line")]
    Empty,

    #[error("quantity must be positive for link {0}")]
    InvalidQuantity(Uuid),

    #[error("quoted price must be positive for link {0}")]
    InvalidPrice(Uuid),

    #[error("unknown product supplier link: {0}")]
    UnknownLink(Uuid),

    #[error("product supplier link {0} is inactive")]
    InactiveLink(Uuid),

    #[error("link {link_id} does not belong to product {product_id}")]
    LinkMismatch { link_id: Uuid, product_id: Uuid },

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Drafts quotes against pending requests. Every line is validated
/// against the catalog before anything is written.
pub struct QuoteBuilder {
    catalog: Arc<dyn CatalogRepository>,
    requests: Arc<dyn RequestRepository>,
    quotes: Arc<dyn QuoteRepository>,
}

impl QuoteBuilder {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        requests: Arc<dyn RequestRepository>,
        quotes: Arc<dyn QuoteRepository>,
    ) -> Self {
        Self {
            catalog,
            requests,
            quotes,
        }
    }

    /// Build and persist a quote for `request_id`. The store commits
    /// the quote, its items, and the request's move to `quoted` as one
    /// unit.
    pub async fn draft(
        &self,
        request_id: Uuid,
        admin: &Actor,
        lines: Vec<QuoteLine>,
    ) -> Result<QuoteDraft, QuoteError> {
        if !admin.is_admin() {
            return Err(QuoteError::Forbidden);
        }
        if lines.is_empty() {
            return Err(QuoteError::Empty);
        }

        let request = self
            .requests
            .get_request(request_id)
            .await
            .map_err(storage)?
            .ok_or(QuoteError::RequestNotFound(request_id))?;
        if request.status == RequestStatus::Accepted {
            return Err(QuoteError::RequestAlreadyAccepted(request_id));
        }

        let mut quote = Quote::new(request_id, admin.user_id);
        let mut items = Vec::with_capacity(lines.len());

        for line in &lines {
            if line.quantity <= 0 {
                return Err(QuoteError::InvalidQuantity(line.product_supplier_id));
            }
            if line.quoted_price <= Decimal::ZERO {
                return Err(QuoteError::InvalidPrice(line.product_supplier_id));
            }

            let link = self
                .catalog
                .get_product_supplier(line.product_supplier_id)
                .await
                .map_err(storage)?
                .ok_or(QuoteError::UnknownLink(line.product_supplier_id))?;
            if !link.is_active {
                return Err(QuoteError::InactiveLink(link.id));
            }
            if link.product_id != line.product_id {
                return Err(QuoteError::LinkMismatch {
                    link_id: link.id,
                    product_id: line.product_id,
                });
            }

            let item = QuoteItem::new(
                quote.id,
                line.product_supplier_id,
                line.quantity,
                line.quoted_price,
            );
            quote.add_item(&item);
            items.push(item);
        }

        self.quotes
            .save_quote(&quote, &items)
            .await
            .map_err(storage)?;

        tracing::info!(
            quote_id = %quote.id,
            request_id = %request_id,
            total_amount = %quote.total_amount,
            lines = items.len(),
            "quote drafted and sent"
        );
        Ok(QuoteDraft { quote, items })
    }
}

fn storage(e: Box<dyn std::error::Error + Send + Sync>) -> QuoteError {
    QuoteError::Storage(e.to_string())
}
