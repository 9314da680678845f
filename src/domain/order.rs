use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::message::OrderRequestDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProduction,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub artisan_profile_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub customization: Option<String>,
    pub specifications: Option<sqlx::types::Json<Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderPricing {
    pub fn from_items(items: &[OrderItem]) -> Self {
        let subtotal = items.iter().map(|item| item.price).sum::<Decimal>();
        Self {
            subtotal,
            shipping_cost: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: subtotal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub pricing: OrderPricing,
    pub status: OrderStatus,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Order produced when an artisan accepts a negotiated request. The line
    /// item price is the agreed price for the whole request.
    pub fn confirmed_from_request(
        customer_id: Uuid,
        conversation_id: Uuid,
        artisan_profile_id: Uuid,
        request: &OrderRequestDetails,
        agreed_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let items = vec![OrderItem {
            product_id: request.product_id,
            artisan_profile_id,
            quantity: request.quantity,
            price: agreed_price,
            customization: request.customization.clone(),
            specifications: request.specifications.clone().map(sqlx::types::Json),
        }];
        let pricing = OrderPricing::from_items(&items);

        Self {
            id,
            order_number: order_number(id, now),
            customer_id,
            conversation_id: Some(conversation_id),
            items,
            pricing,
            status: OrderStatus::Confirmed,
            confirmed_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }
}

fn order_number(id: Uuid, at: DateTime<Utc>) -> String {
    let simple = id.simple().to_string().to_uppercase();
    format!("ORD-{}-{}", at.format("%Y%m%d"), &simple[..8])
}
