use crate::models::{Quote, QuoteItem};
use crate::request::{Request, RequestItem};
use async_trait::async_trait;
use procura_catalog::ProductSupplier;
use uuid::Uuid;

#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Persist a request together with its items.
    async fn create_request(
        &self,
        request: &Request,
        items: &[RequestItem],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_request(
        &self,
        id: Uuid,
    ) -> Result<Option<Request>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_request_items(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<RequestItem>, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Persist a drafted quote and its items, and move the parent
    /// request to `quoted`, atomically.
    async fn save_quote(
        &self,
        quote: &Quote,
        items: &[QuoteItem],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_quote(
        &self,
        id: Uuid,
    ) -> Result<Option<Quote>, Box<dyn std::error::Error + Send + Sync>>;

    /// Items of a quote with their product-supplier link expanded, the
    /// relational read the aggregator consumes. A dangling link comes
    /// back as `None` and is the caller's resolution failure to raise.
    async fn list_items_with_links(
        &self,
        quote_id: Uuid,
    ) -> Result<Vec<(QuoteItem, Option<ProductSupplier>)>, Box<dyn std::error::Error + Send + Sync>>;
}
