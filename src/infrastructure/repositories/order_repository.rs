use super::traits::OrderRepository;
use crate::domain::{Order, OrderItem, OrderPricing, OrderStatus};
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, order_number, customer_id, conversation_id, subtotal, \
    shipping_cost, tax, total, status, confirmed_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    conversation_id: Option<Uuid>,
    subtotal: Decimal,
    shipping_cost: Decimal,
    tax: Decimal,
    total: Decimal,
    status: OrderStatus,
    confirmed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            conversation_id: self.conversation_id,
            items,
            pricing: OrderPricing {
                subtotal: self.subtotal,
                shipping_cost: self.shipping_cost,
                tax: self.tax,
                total: self.total,
            },
            status: self.status,
            confirmed_at: self.confirmed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    artisan_profile_id: Uuid,
    quantity: i32,
    price: Decimal,
    customization: Option<String>,
    specifications: Option<Json<Value>>,
}

impl OrderItemRow {
    fn into_item(self) -> OrderItem {
        OrderItem {
            product_id: self.product_id,
            artisan_profile_id: self.artisan_profile_id,
            quantity: self.quantity,
            price: self.price,
            customization: self.customization,
            specifications: self.specifications,
        }
    }
}

/// Writes the order header and its line items on the caller's connection so
/// it can share a transaction with the message that confirms it.
pub(super) async fn insert_order(conn: &mut PgConnection, order: &Order) -> AppResult<Order> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r#"
        INSERT INTO orders (
            id, order_number, customer_id, conversation_id, subtotal, shipping_cost, tax, total,
            status, confirmed_at, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.customer_id)
    .bind(order.conversation_id)
    .bind(order.pricing.subtotal)
    .bind(order.pricing.shipping_cost)
    .bind(order.pricing.tax)
    .bind(order.pricing.total)
    .bind(order.status)
    .bind(order.confirmed_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(order.items.len());
    for (position, item) in (0_i32..).zip(order.items.iter()) {
        let stored = sqlx::query_as::<_, OrderItemRow>(
            r#"
            INSERT INTO order_items (
                order_id, position, product_id, artisan_profile_id, quantity, price,
                customization, specifications
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING order_id, product_id, artisan_profile_id, quantity, price, customization, specifications
            "#,
        )
        .bind(order.id)
        .bind(position)
        .bind(item.product_id)
        .bind(item.artisan_profile_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(&item.customization)
        .bind(&item.specifications)
        .fetch_one(&mut *conn)
        .await?;
        items.push(stored.into_item());
    }

    Ok(row.into_order(items))
}

pub struct OrderRepositoryImpl {
    pool: PgPool,
}

impl OrderRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_items(&self, rows: Vec<OrderRow>) -> AppResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT order_id, product_id, artisan_profile_id, quantity, price, customization, specifications
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order
                .entry(item.order_id)
                .or_default()
                .push(item.into_item());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}

#[async_trait]
impl OrderRepository for OrderRepositoryImpl {
    async fn create(&self, order: &Order) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;
        let created = insert_order(&mut tx, order).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Order>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ANY($1) ORDER BY created_at, id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        self.with_items(rows).await
    }
}
