use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procura_catalog::{CatalogRepository, Product, ProductSupplier, Supplier};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductSupplierRow {
    id: Uuid,
    product_id: Uuid,
    supplier_id: Uuid,
    cost_price: Decimal,
    sell_price: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductSupplierRow> for ProductSupplier {
    fn from(row: ProductSupplierRow) -> Self {
        ProductSupplier {
            id: row.id,
            product_id: row.product_id,
            supplier_id: row.supplier_id,
            cost_price: row.cost_price,
            sell_price: row.sell_price,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, category, created_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    async fn get_supplier(
        &self,
        id: Uuid,
    ) -> Result<Option<Supplier>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<SupplierRow> = sqlx::query_as(
            "SELECT id, name, contact_person, phone, email, address, created_at \
             FROM suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Supplier::from))
    }

    async fn get_product_supplier(
        &self,
        id: Uuid,
    ) -> Result<Option<ProductSupplier>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<ProductSupplierRow> = sqlx::query_as(
            "SELECT id, product_id, supplier_id, cost_price, sell_price, is_active, created_at \
             FROM product_suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ProductSupplier::from))
    }

    async fn list_active_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ProductSupplier>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<ProductSupplierRow> = sqlx::query_as(
            "SELECT id, product_id, supplier_id, cost_price, sell_price, is_active, created_at \
             FROM product_suppliers WHERE product_id = $1 AND is_active ORDER BY created_at",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProductSupplier::from).collect())
    }
}
