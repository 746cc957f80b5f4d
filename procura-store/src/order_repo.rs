use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procura_order::{
    AcceptanceCommit, CustomerPayment, Order, OrderItem, OrderRepository, OrderStatus,
    PaymentRepository, QuoteAcceptance,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    quote_id: Uuid,
    customer_id: Uuid,
    supplier_id: Uuid,
    total_cost: Decimal,
    total_sell: Decimal,
    profit: Decimal,
    status: String,
    tracking_code: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            quote_id: row.quote_id,
            customer_id: row.customer_id,
            supplier_id: row.supplier_id,
            total_cost: row.total_cost,
            total_sell: row.total_sell,
            profit: row.profit,
            status: row.status.parse()?,
            tracking_code: row.tracking_code,
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_supplier_id: Uuid,
    quantity: i32,
    cost_price: Decimal,
    sell_price: Decimal,
    subtotal: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_supplier_id: row.product_supplier_id,
            quantity: row.quantity,
            cost_price: row.cost_price,
            sell_price: row.sell_price,
            subtotal: row.subtotal,
        }
    }
}

const ORDER_COLUMNS: &str = "id, quote_id, customer_id, supplier_id, total_cost, total_sell, \
                             profit, status, tracking_code, completed_at, created_at";

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn commit_acceptance(
        &self,
        acceptance: &QuoteAcceptance,
    ) -> Result<AcceptanceCommit, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-set on the quote status. Zero rows means another
        // acceptance already flipped it; nothing else may be written.
        let flipped =
            sqlx::query("UPDATE quotes SET status = 'accepted' WHERE id = $1 AND status = 'sent'")
                .bind(acceptance.quote_id)
                .execute(&mut *tx)
                .await?;
        if flipped.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(AcceptanceCommit::LostRace);
        }

        for materialized in &acceptance.orders {
            let order = &materialized.order;
            sqlx::query(
                "INSERT INTO orders \
                 (id, quote_id, customer_id, supplier_id, total_cost, total_sell, profit, \
                  status, tracking_code, completed_at, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(order.id)
            .bind(order.quote_id)
            .bind(order.customer_id)
            .bind(order.supplier_id)
            .bind(order.total_cost)
            .bind(order.total_sell)
            .bind(order.profit)
            .bind(order.status.to_string())
            .bind(&order.tracking_code)
            .bind(order.completed_at)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;

            for item in &materialized.items {
                sqlx::query(
                    "INSERT INTO order_items \
                     (id, order_id, product_supplier_id, quantity, cost_price, sell_price, subtotal) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(item.id)
                .bind(item.order_id)
                .bind(item.product_supplier_id)
                .bind(item.quantity)
                .bind(item.cost_price)
                .bind(item.sell_price)
                .bind(item.subtotal)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query("UPDATE requests SET status = 'accepted' WHERE id = $1")
            .bind(acceptance.request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AcceptanceCommit::Committed)
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_supplier_id, quantity, cost_price, sell_price, subtotal \
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at"))
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE orders SET status = $2, completed_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .bind(completed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_tracking(
        &self,
        id: Uuid,
        tracking_code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE orders SET tracking_code = $2, status = 'shipping' WHERE id = $1")
            .bind(id)
            .bind(tracking_code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    amount: Decimal,
    payment_method: String,
    note: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for CustomerPayment {
    fn from(row: PaymentRow) -> Self {
        CustomerPayment {
            id: row.id,
            order_id: row.order_id,
            amount: row.amount,
            payment_method: row.payment_method,
            note: row.note,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

const PAYMENT_COLUMNS: &str = "id, order_id, amount, payment_method, note, created_by, created_at";

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn record(
        &self,
        payment: &CustomerPayment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO customer_payments \
             (id, order_id, amount, payment_method, note, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(payment.id)
        .bind(payment.order_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.note)
        .bind(payment.created_by)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<CustomerPayment>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM customer_payments \
             WHERE order_id = $1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CustomerPayment::from).collect())
    }

    async fn list_all(
        &self,
    ) -> Result<Vec<CustomerPayment>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM customer_payments ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CustomerPayment::from).collect())
    }
}
