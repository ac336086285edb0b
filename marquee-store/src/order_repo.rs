use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::BTreeSet;
use uuid::Uuid;

use marquee_core::{Customer, Order, OrderLedger, OrderStatus, StoreResult};

use crate::retry::with_retry;

/// Postgres order ledger; the durable source of truth for sold seats.
pub struct PgOrderLedger {
    pool: PgPool,
}

impl PgOrderLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    hold_id: Uuid,
    show_id: Uuid,
    holder_id: String,
    seat_ids: Vec<String>,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    amount_cents: i64,
    status: String,
    ticket_code: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self) -> StoreResult<Order> {
        let status: OrderStatus = self.status.parse()?;
        Ok(Order {
            id: self.id,
            hold_id: self.hold_id,
            show_id: self.show_id,
            holder_id: self.holder_id,
            seat_ids: self.seat_ids,
            customer: Customer {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            amount_cents: self.amount_cents,
            status,
            ticket_code: self.ticket_code,
            created_at: self.created_at,
            expires_at: self.expires_at,
            confirmed_at: self.confirmed_at,
        })
    }
}

const SELECT_ORDER: &str = "SELECT id, hold_id, show_id, holder_id, seat_ids, customer_name, \
     customer_email, customer_phone, amount_cents, status, ticket_code, created_at, expires_at, \
     confirmed_at FROM orders";

#[async_trait]
impl OrderLedger for PgOrderLedger {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, hold_id, show_id, holder_id, seat_ids, customer_name,
                customer_email, customer_phone, amount_cents, status, ticket_code, created_at,
                expires_at, confirmed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id)
        .bind(order.hold_id)
        .bind(order.show_id)
        .bind(&order.holder_id)
        .bind(&order.seat_ids)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(order.amount_cents)
        .bind(order.status.as_str())
        .bind(&order.ticket_code)
        .bind(order.created_at)
        .bind(order.expires_at)
        .bind(order.confirmed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let sql = format!("{SELECT_ORDER} WHERE id = $1");
        let row = with_retry("order fetch", || async {
            let row: Option<OrderRow> = sqlx::query_as(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        })
        .await?;
        row.map(OrderRow::into_order).transpose()
    }

    async fn list_orders(&self, holder_id: &str) -> StoreResult<Vec<Order>> {
        let sql = format!("{SELECT_ORDER} WHERE holder_id = $1 ORDER BY created_at DESC");
        let rows = with_retry("order list", || async {
            let rows: Vec<OrderRow> = sqlx::query_as(&sql)
                .bind(holder_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        })
        .await?;
        rows.into_iter().map(OrderRow::into_order).collect()
    }

    async fn confirmed_seats(&self, show_id: Uuid) -> StoreResult<BTreeSet<String>> {
        let rows = with_retry("confirmed seats", || async {
            let rows: Vec<(Vec<String>,)> =
                sqlx::query_as("SELECT seat_ids FROM orders WHERE show_id = $1 AND status = $2")
                    .bind(show_id)
                    .bind(OrderStatus::Confirmed.as_str())
                    .fetch_all(&self.pool)
                    .await?;
            Ok(rows)
        })
        .await?;
        Ok(rows.into_iter().flat_map(|(seats,)| seats).collect())
    }

    async fn mark_confirmed(
        &self,
        id: Uuid,
        ticket_code: &str,
        confirmed_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, ticket_code = $3, confirmed_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(OrderStatus::Confirmed.as_str())
        .bind(ticket_code)
        .bind(confirmed_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(format!("order not found: {id}").into());
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(OrderStatus::Failed.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(format!("order not found: {id}").into());
        }
        Ok(())
    }
}
