use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            contact_person: None,
            phone: None,
            email: None,
            address: None,
            created_at: Utc::now(),
        }
    }
}

/// Links a product to a supplier, carrying that supplier's cost and
/// sell price for the product. Quote items pin one of these links, so
/// an item pins both the product and the supplier at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSupplier {
    pub id: Uuid,
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductSupplier {
    pub fn new(
        product_id: Uuid,
        supplier_id: Uuid,
        cost_price: Decimal,
        sell_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            supplier_id,
            cost_price,
            sell_price,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Margin per unit at list price.
    pub fn margin(&self) -> Decimal {
        self.sell_price - self.cost_price
    }
}
