use crate::repository::RequestRepository;
use chrono::{DateTime, Utc};
use procura_catalog::CatalogRepository;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Quoted,
    Accepted,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Quoted => write!(f, "quoted"),
            RequestStatus::Accepted => write!(f, "accepted"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownRequestStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownRequestStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "quoted" => Ok(RequestStatus::Quoted),
            "accepted" => Ok(RequestStatus::Accepted),
            other => Err(UnknownRequestStatus(other.to_string())),
        }
    }
}

/// A customer's procurement ask: the products and quantities they want
/// sourced, before any pricing exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: RequestStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Request {
    pub fn new(customer_id: Uuid, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            status: RequestStatus::Pending,
            note,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestItem {
    pub id: Uuid,
    pub request_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl RequestItem {
    pub fn new(request_id: Uuid, product_id: Uuid, quantity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            product_id,
            quantity,
        }
    }
}

/// One desired product/quantity pair on an incoming request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("a request needs at least one line")]
    Empty,

    #[error("quantity must be positive for product {0}")]
    InvalidQuantity(Uuid),

    #[error("unknown product: {0}")]
    UnknownProduct(Uuid),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Accepts customer requests after validating every line against the
/// catalog.
pub struct RequestIntake {
    catalog: Arc<dyn CatalogRepository>,
    requests: Arc<dyn RequestRepository>,
}

impl RequestIntake {
    pub fn new(catalog: Arc<dyn CatalogRepository>, requests: Arc<dyn RequestRepository>) -> Self {
        Self { catalog, requests }
    }

    pub async fn submit(
        &self,
        customer_id: Uuid,
        note: Option<String>,
        lines: Vec<RequestLine>,
    ) -> Result<Request, RequestError> {
        if lines.is_empty() {
            return Err(RequestError::Empty);
        }

        for line in &lines {
            if line.quantity <= 0 {
                return Err(RequestError::InvalidQuantity(line.product_id));
            }
            let product = self
                .catalog
                .get_product(line.product_id)
                .await
                .map_err(|e| RequestError::Storage(e.to_string()))?;
            if product.is_none() {
                return Err(RequestError::UnknownProduct(line.product_id));
            }
        }

        let request = Request::new(customer_id, note);
        let items: Vec<RequestItem> = lines
            .iter()
            .map(|line| RequestItem::new(request.id, line.product_id, line.quantity))
            .collect();

        self.requests
            .create_request(&request, &items)
            .await
            .map_err(|e| RequestError::Storage(e.to_string()))?;

        tracing::info!(
            request_id = %request.id,
            customer_id = %customer_id,
            lines = items.len(),
            "procurement request submitted"
        );
        Ok(request)
    }
}
