//! # Order Repository
//!
//! Placed orders and their payment status.
//!
//! ## Payment Updates
//! ```text
//! webhook ──► PaymentStatus::transition(current, incoming)
//!                 │
//!                 ├── Ignore  → nothing written
//!                 └── Apply   → update_payment_status(id, current, next)
//!                                 UPDATE ... WHERE id = ? AND payment_status = current
//!                                 │
//!                                 ├── 1 row  → applied
//!                                 └── 0 rows → another webhook got there first
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hornada_core::{CartLine, Fulfillment, Money, Order, PaymentStatus};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    cart_id: String,
    lines: String,
    fulfillment: String,
    zone_id: Option<String>,
    coupon_code: Option<String>,
    subtotal_cents: i64,
    discount_cents: i64,
    shipping_cents: i64,
    total_cents: i64,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        let lines: Vec<CartLine> = serde_json::from_str(&row.lines)?;

        let fulfillment = Fulfillment::parse(&row.fulfillment).ok_or_else(|| {
            DbError::InvalidData(format!("order {} has fulfillment {}", row.id, row.fulfillment))
        })?;

        let payment_status = PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
            DbError::InvalidData(format!(
                "order {} has payment status {}",
                row.id, row.payment_status
            ))
        })?;

        Ok(Order {
            id: row.id,
            cart_id: row.cart_id,
            lines,
            fulfillment,
            zone_id: row.zone_id,
            coupon_code: row.coupon_code,
            subtotal: Money::from_cents(row.subtotal_cents),
            discount: Money::from_cents(row.discount_cents),
            shipping: Money::from_cents(row.shipping_cents),
            total: Money::from_cents(row.total_cents),
            payment_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn create(&self, order: &Order) -> DbResult<()> {
        insert_order(&self.pool, order).await
    }

    /// Inserts the order and deletes its cart snapshot in one transaction.
    ///
    /// If the insert fails the cart is left as it was.
    pub async fn create_and_clear_cart(&self, order: &Order) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        insert_order(&mut *tx, order).await?;

        sqlx::query("DELETE FROM cart_snapshots WHERE cart_id = ?1")
            .bind(&order.cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT
                id, cart_id, lines, fulfillment, zone_id, coupon_code,
                subtotal_cents, discount_cents, shipping_cents, total_cents,
                payment_status, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Moves an order from `expected` to `next`.
    ///
    /// Returns false when the stored status is no longer `expected`, so a
    /// concurrent webhook can't be overwritten with a stale decision.
    pub async fn update_payment_status(
        &self,
        id: &str,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> DbResult<bool> {
        debug!(
            order_id = %id,
            from = expected.as_str(),
            to = next.as_str(),
            "Updating payment status"
        );

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = ?1, updated_at = ?2
            WHERE id = ?3 AND payment_status = ?4
            "#,
        )
        .bind(next.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

async fn insert_order<'e, E>(executor: E, order: &Order) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    debug!(
        order_id = %order.id,
        cart_id = %order.cart_id,
        total = order.total.cents(),
        "Creating order"
    );

    let lines = serde_json::to_string(&order.lines)?;

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, cart_id, lines, fulfillment, zone_id, coupon_code,
            subtotal_cents, discount_cents, shipping_cents, total_cents,
            payment_status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&order.id)
    .bind(&order.cart_id)
    .bind(lines)
    .bind(order.fulfillment.as_str())
    .bind(&order.zone_id)
    .bind(&order.coupon_code)
    .bind(order.subtotal.cents())
    .bind(order.discount.cents())
    .bind(order.shipping.cents())
    .bind(order.total.cents())
    .bind(order.payment_status.as_str())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}
