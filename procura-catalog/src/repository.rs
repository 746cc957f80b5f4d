use crate::product::Product;
use crate::supplier::{ProductSupplier, Supplier};
use async_trait::async_trait;
use uuid::Uuid;

/// Read boundary over the product/supplier catalog. Catalog CRUD is
/// owned by the surrounding application; the engine only resolves
/// links and validates what it is handed.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_supplier(
        &self,
        id: Uuid,
    ) -> Result<Option<Supplier>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_product_supplier(
        &self,
        id: Uuid,
    ) -> Result<Option<ProductSupplier>, Box<dyn std::error::Error + Send + Sync>>;

    /// Active supplier links for a product, the options an admin can
    /// quote from.
    async fn list_active_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ProductSupplier>, Box<dyn std::error::Error + Send + Sync>>;
}
