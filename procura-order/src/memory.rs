use crate::models::{CustomerPayment, Order, OrderItem, OrderStatus, QuoteAcceptance};
use crate::repository::{AcceptanceCommit, OrderRepository, PaymentRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procura_catalog::{CatalogRepository, Product, ProductSupplier, Supplier};
use procura_quote::request::RequestStatus;
use procura_quote::{
    Quote, QuoteItem, QuoteRepository, QuoteStatus, Request, RequestItem, RequestRepository,
};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    products: HashMap<Uuid, Product>,
    suppliers: HashMap<Uuid, Supplier>,
    links: HashMap<Uuid, ProductSupplier>,
    requests: HashMap<Uuid, Request>,
    request_items: Vec<RequestItem>,
    quotes: HashMap<Uuid, Quote>,
    quote_items: Vec<QuoteItem>,
    orders: HashMap<Uuid, Order>,
    order_items: Vec<OrderItem>,
    payments: Vec<CustomerPayment>,
}

/// In-memory implementation of every repository trait, with the same
/// compare-and-set acceptance semantics as the Postgres store. Backs
/// the engine's tests; also handy for demos without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: Product) {
        self.inner.lock().unwrap().products.insert(product.id, product);
    }

    pub fn insert_supplier(&self, supplier: Supplier) {
        self.inner
            .lock()
            .unwrap()
            .suppliers
            .insert(supplier.id, supplier);
    }

    pub fn insert_link(&self, link: ProductSupplier) {
        self.inner.lock().unwrap().links.insert(link.id, link);
    }

    /// Drop a link record, leaving quote items that reference it
    /// dangling. Used to exercise resolution failures.
    pub fn remove_link(&self, link_id: Uuid) {
        self.inner.lock().unwrap().links.remove(&link_id);
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn insert_order(&self, order: Order) {
        self.inner.lock().unwrap().orders.insert(order.id, order);
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, BoxError> {
        Ok(self.inner.lock().unwrap().products.get(&id).cloned())
    }

    async fn get_supplier(&self, id: Uuid) -> Result<Option<Supplier>, BoxError> {
        Ok(self.inner.lock().unwrap().suppliers.get(&id).cloned())
    }

    async fn get_product_supplier(&self, id: Uuid) -> Result<Option<ProductSupplier>, BoxError> {
        Ok(self.inner.lock().unwrap().links.get(&id).cloned())
    }

    async fn list_active_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ProductSupplier>, BoxError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .links
            .values()
            .filter(|link| link.product_id == product_id && link.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn create_request(
        &self,
        request: &Request,
        items: &[RequestItem],
    ) -> Result<(), BoxError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.insert(request.id, request.clone());
        inner.request_items.extend_from_slice(items);
        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<Request>, BoxError> {
        Ok(self.inner.lock().unwrap().requests.get(&id).cloned())
    }

    async fn list_request_items(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<RequestItem>, BoxError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .request_items
            .iter()
            .filter(|item| item.request_id == request_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuoteRepository for MemoryStore {
    async fn save_quote(&self, quote: &Quote, items: &[QuoteItem]) -> Result<(), BoxError> {
        let mut inner = self.inner.lock().unwrap();
        inner.quotes.insert(quote.id, quote.clone());
        inner.quote_items.extend_from_slice(items);
        if let Some(request) = inner.requests.get_mut(&quote.request_id) {
            request.status = RequestStatus::Quoted;
        }
        Ok(())
    }

    async fn get_quote(&self, id: Uuid) -> Result<Option<Quote>, BoxError> {
        Ok(self.inner.lock().unwrap().quotes.get(&id).cloned())
    }

    async fn list_items_with_links(
        &self,
        quote_id: Uuid,
    ) -> Result<Vec<(QuoteItem, Option<ProductSupplier>)>, BoxError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .quote_items
            .iter()
            .filter(|item| item.quote_id == quote_id)
            .map(|item| {
                let link = inner.links.get(&item.product_supplier_id).cloned();
                (item.clone(), link)
            })
            .collect())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn commit_acceptance(
        &self,
        acceptance: &QuoteAcceptance,
    ) -> Result<AcceptanceCommit, BoxError> {
        let mut inner = self.inner.lock().unwrap();

        // Compare-and-set on the quote status, everything else under
        // the same lock so the commit is atomic.
        match inner.quotes.get_mut(&acceptance.quote_id) {
            Some(quote) if quote.status == QuoteStatus::Sent => {
                quote.status = QuoteStatus::Accepted;
            }
            Some(_) => return Ok(AcceptanceCommit::LostRace),
            None => return Err(format!("quote {} missing", acceptance.quote_id).into()),
        }

        for materialized in &acceptance.orders {
            inner
                .orders
                .insert(materialized.order.id, materialized.order.clone());
            inner.order_items.extend_from_slice(&materialized.items);
        }
        if let Some(request) = inner.requests.get_mut(&acceptance.request_id) {
            request.status = RequestStatus::Accepted;
        }
        Ok(AcceptanceCommit::Committed)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, BoxError> {
        Ok(self.inner.lock().unwrap().orders.get(&id).cloned())
    }

    async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, BoxError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, BoxError> {
        let mut orders: Vec<Order> = self.inner.lock().unwrap().orders.values().cloned().collect();
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), BoxError> {
        let mut inner = self.inner.lock().unwrap();
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or_else(|| format!("order {id} missing"))?;
        order.status = status;
        order.completed_at = completed_at;
        Ok(())
    }

    async fn set_tracking(&self, id: Uuid, tracking_code: &str) -> Result<(), BoxError> {
        let mut inner = self.inner.lock().unwrap();
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or_else(|| format!("order {id} missing"))?;
        order.tracking_code = Some(tracking_code.to_string());
        order.status = OrderStatus::Shipping;
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn record(&self, payment: &CustomerPayment) -> Result<(), BoxError> {
        self.inner.lock().unwrap().payments.push(payment.clone());
        Ok(())
    }

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<CustomerPayment>, BoxError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|payment| payment.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<CustomerPayment>, BoxError> {
        Ok(self.inner.lock().unwrap().payments.clone())
    }
}
