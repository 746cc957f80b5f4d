use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procura_catalog::ProductSupplier;
use procura_quote::{Quote, QuoteItem, QuoteRepository, Request, RequestItem, RequestRepository};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresRequestRepository {
    pool: PgPool,
}

impl PostgresRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    customer_id: Uuid,
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for Request {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Request {
            id: row.id,
            customer_id: row.customer_id,
            status: row.status.parse()?,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RequestItemRow {
    id: Uuid,
    request_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

impl From<RequestItemRow> for RequestItem {
    fn from(row: RequestItemRow) -> Self {
        RequestItem {
            id: row.id,
            request_id: row.request_id,
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn create_request(
        &self,
        request: &Request,
        items: &[RequestItem],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO requests (id, customer_id, status, note, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(request.id)
        .bind(request.customer_id)
        .bind(request.status.to_string())
        .bind(&request.note)
        .bind(request.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO request_items (id, request_id, product_id, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(item.id)
            .bind(item.request_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_request(
        &self,
        id: Uuid,
    ) -> Result<Option<Request>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<RequestRow> = sqlx::query_as(
            "SELECT id, customer_id, status, note, created_at FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Request::try_from).transpose()
    }

    async fn list_request_items(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<RequestItem>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<RequestItemRow> = sqlx::query_as(
            "SELECT id, request_id, product_id, quantity \
             FROM request_items WHERE request_id = $1 ORDER BY id",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RequestItem::from).collect())
    }
}

pub struct PostgresQuoteRepository {
    pool: PgPool,
}

impl PostgresQuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    request_id: Uuid,
    admin_id: Uuid,
    status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        Ok(Quote {
            id: row.id,
            request_id: row.request_id,
            admin_id: row.admin_id,
            status: row.status.parse()?,
            total_amount: row.total_amount,
            created_at: row.created_at,
        })
    }
}

/// Quote item joined to its product-supplier link. The link columns are
/// nullable because the join is LEFT: a dangling link surfaces as
/// `None`, not as a dropped row.
#[derive(sqlx::FromRow)]
struct QuoteItemLinkRow {
    id: Uuid,
    quote_id: Uuid,
    product_supplier_id: Uuid,
    quantity: i32,
    quoted_price: Decimal,
    subtotal: Decimal,
    ps_id: Option<Uuid>,
    ps_product_id: Option<Uuid>,
    ps_supplier_id: Option<Uuid>,
    ps_cost_price: Option<Decimal>,
    ps_sell_price: Option<Decimal>,
    ps_is_active: Option<bool>,
    ps_created_at: Option<DateTime<Utc>>,
}

impl QuoteItemLinkRow {
    fn split(self) -> (QuoteItem, Option<ProductSupplier>) {
        let item = QuoteItem {
            id: self.id,
            quote_id: self.quote_id,
            product_supplier_id: self.product_supplier_id,
            quantity: self.quantity,
            quoted_price: self.quoted_price,
            subtotal: self.subtotal,
        };
        let link = match (
            self.ps_id,
            self.ps_product_id,
            self.ps_supplier_id,
            self.ps_cost_price,
            self.ps_sell_price,
            self.ps_is_active,
            self.ps_created_at,
        ) {
            (
                Some(id),
                Some(product_id),
                Some(supplier_id),
                Some(cost_price),
                Some(sell_price),
                Some(is_active),
                Some(created_at),
            ) => Some(ProductSupplier {
                id,
                product_id,
                supplier_id,
                cost_price,
                sell_price,
                is_active,
                created_at,
            }),
            _ => None,
        };
        (item, link)
    }
}

#[async_trait]
impl QuoteRepository for PostgresQuoteRepository {
    async fn save_quote(
        &self,
        quote: &Quote,
        items: &[QuoteItem],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO quotes (id, request_id, admin_id, status, total_amount, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(quote.id)
        .bind(quote.request_id)
        .bind(quote.admin_id)
        .bind(quote.status.to_string())
        .bind(quote.total_amount)
        .bind(quote.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO quote_items \
                 (id, quote_id, product_supplier_id, quantity, quoted_price, subtotal) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(item.id)
            .bind(item.quote_id)
            .bind(item.product_supplier_id)
            .bind(item.quantity)
            .bind(item.quoted_price)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE requests SET status = 'quoted' WHERE id = $1")
            .bind(quote.request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_quote(
        &self,
        id: Uuid,
    ) -> Result<Option<Quote>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<QuoteRow> = sqlx::query_as(
            "SELECT id, request_id, admin_id, status, total_amount, created_at \
             FROM quotes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Quote::try_from).transpose()
    }

    async fn list_items_with_links(
        &self,
        quote_id: Uuid,
    ) -> Result<Vec<(QuoteItem, Option<ProductSupplier>)>, Box<dyn std::error::Error + Send + Sync>>
    {
        let rows: Vec<QuoteItemLinkRow> = sqlx::query_as(
            "SELECT qi.id, qi.quote_id, qi.product_supplier_id, qi.quantity, \
                    qi.quoted_price, qi.subtotal, \
                    ps.id AS ps_id, ps.product_id AS ps_product_id, \
                    ps.supplier_id AS ps_supplier_id, ps.cost_price AS ps_cost_price, \
                    ps.sell_price AS ps_sell_price, ps.is_active AS ps_is_active, \
                    ps.created_at AS ps_created_at \
             FROM quote_items qi \
             LEFT JOIN product_suppliers ps ON ps.id = qi.product_supplier_id \
             WHERE qi.quote_id = $1 \
             ORDER BY qi.id",
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(QuoteItemLinkRow::split).collect())
    }
}
