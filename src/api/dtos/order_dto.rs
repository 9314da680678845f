use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::conversation_dto::MessageResponse;
use crate::domain::{Order, OrderStatus};

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub artisan_profile_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub customization: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    #[schema(value_type = String, example = "confirmed")]
    pub status: OrderStatus,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            customer_id: order.customer_id,
            conversation_id: order.conversation_id,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id,
                    artisan_profile_id: item.artisan_profile_id,
                    quantity: item.quantity,
                    price: item.price,
                    customization: item.customization,
                    specifications: item.specifications.map(|json| json.0),
                })
                .collect(),
            subtotal: order.pricing.subtotal,
            shipping_cost: order.pricing.shipping_cost,
            tax: order.pricing.tax,
            total: order.pricing.total,
            status: order.status,
            confirmed_at: order.confirmed_at,
            created_at: order.created_at,
        }
    }
}

/// Outcome of answering an order request: the response message and, when
/// accepted, the order it created.
#[derive(Debug, Serialize, ToSchema)]
pub struct RespondToOrderResponse {
    pub message: MessageResponse,
    pub order: Option<OrderResponse>,
}
