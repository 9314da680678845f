use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::PaginationMeta;
use crate::domain::{
    ConversationPriority, ConversationStatus, MessageType, OrderRequestState, ParticipantRole,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartConversationRequest {
    pub artisan_profile_id: Uuid,
    #[validate(length(max = 200, message = "subject must be at most 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "initial message is required"))]
    pub initial_message: String,
    pub related_product_id: Option<Uuid>,
    pub related_design_id: Option<Uuid>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "normal")]
    pub priority: Option<ConversationPriority>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "text")]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    #[validate(length(max = 10, message = "at most 10 attachments are allowed"))]
    pub attachments: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct PriceRangeDto {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendOrderRequestRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 10000, message = "quantity must be between 1 and 10000"))]
    pub quantity: i32,
    #[validate(length(max = 2000, message = "customization must be at most 2000 characters"))]
    pub customization: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<Value>,
    pub requested_price: Option<PriceRangeDto>,
    #[validate(length(max = 200, message = "timeline must be at most 200 characters"))]
    pub timeline: Option<String>,
    pub message: Option<String>,
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RespondToOrderRequest {
    pub original_message_id: Uuid,
    pub accepted: bool,
    pub response_message: Option<String>,
    pub final_price: Option<Decimal>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[validate(length(max = 2000, message = "terms must be at most 2000 characters"))]
    pub terms: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConversationListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// `active` (default), `archived`, `blocked` or `all`
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantResponse {
    pub user_id: Uuid,
    #[schema(value_type = String, example = "customer")]
    pub role: ParticipantRole,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    #[schema(value_type = String, example = "text")]
    pub message_type: MessageType,
    pub attachments: Vec<String>,
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Present on order requests only.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "pending")]
    pub order_state: Option<OrderRequestState>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub artisan_profile_id: Uuid,
    pub customer_user_id: Uuid,
    pub subject: String,
    #[schema(value_type = String, example = "active")]
    pub status: ConversationStatus,
    #[schema(value_type = String, example = "normal")]
    pub priority: ConversationPriority,
    pub participants: Vec<ParticipantResponse>,
    pub last_message: Option<MessageResponse>,
    pub last_activity_at: DateTime<Utc>,
    pub related_product_id: Option<Uuid>,
    pub related_design_id: Option<Uuid>,
    pub order_ids: Vec<Uuid>,
    /// Messages from the other participant not yet read by the caller.
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartConversationResponse {
    pub conversation: ConversationResponse,
    pub message: MessageResponse,
    /// False when the message was appended to an existing active conversation.
    pub created: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationDetailResponse {
    pub conversation: ConversationResponse,
    /// Oldest first within the page.
    pub messages: Vec<MessageResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}
