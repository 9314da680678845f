use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    OrderRequest,
    OrderResponse,
    ProductShare,
    DesignShare,
}

impl MessageType {
    pub const fn is_order_protocol(&self) -> bool {
        matches!(self, Self::OrderRequest | Self::OrderResponse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Exclusive upper bound of a money amount. Prices are stored as `NUMERIC(12, 2)`.
pub fn amount_ceiling() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

/// Accepts amounts that fit a money column without rounding or overflow.
pub fn check_amount(field: &str, amount: Decimal) -> Result<(), DomainError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::ValidationError(format!(
            "{field} cannot be negative"
        )));
    }
    if amount.normalize().scale() > 2 {
        return Err(DomainError::ValidationError(format!(
            "{field} must have at most 2 decimal places"
        )));
    }
    if amount >= amount_ceiling() {
        return Err(DomainError::ValidationError(format!(
            "{field} must be less than {}",
            amount_ceiling()
        )));
    }
    Ok(())
}

impl PriceRange {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_amount("price range minimum", self.min)?;
        check_amount("price range maximum", self.max)?;
        if self.min > self.max {
            return Err(DomainError::ValidationError(
                "price range minimum cannot exceed maximum".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequestDetails {
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub customization: Option<String>,
    #[serde(default)]
    pub specifications: Option<Value>,
    pub estimated_price: PriceRange,
    #[serde(default)]
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponseDetails {
    #[serde(default)]
    pub order_id: Option<Uuid>,
    pub product_id: Uuid,
    pub original_message_id: Uuid,
    pub accepted: bool,
    #[serde(default)]
    pub final_price: Option<Decimal>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub terms: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct OrderRequestEnvelope {
    order_details: OrderRequestDetails,
}

/// Type-specific metadata carried by a message.
///
/// Presentation-only kinds keep their metadata opaque; the order protocol
/// kinds carry the shapes the negotiation flow depends on.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    Text(Value),
    Image(Value),
    ProductShare(Value),
    DesignShare(Value),
    OrderRequest(OrderRequestDetails),
    OrderResponse(OrderResponseDetails),
}

impl MessagePayload {
    pub fn text() -> Self {
        Self::Text(empty_metadata())
    }

    /// Builds a payload for the generic send path. Order protocol kinds are
    /// only produced by their dedicated operations.
    pub fn generic(message_type: MessageType, metadata: Option<Value>) -> Result<Self, DomainError> {
        let metadata = match metadata {
            None | Some(Value::Null) => empty_metadata(),
            Some(value @ Value::Object(_)) => value,
            Some(_) => {
                return Err(DomainError::ValidationError(
                    "metadata must be a JSON object".to_string(),
                ))
            }
        };

        match message_type {
            MessageType::Text => Ok(Self::Text(metadata)),
            MessageType::Image => Ok(Self::Image(metadata)),
            MessageType::ProductShare => Ok(Self::ProductShare(metadata)),
            MessageType::DesignShare => Ok(Self::DesignShare(metadata)),
            MessageType::OrderRequest | MessageType::OrderResponse => {
                Err(DomainError::ValidationError(
                    "order messages must be sent through the order endpoints".to_string(),
                ))
            }
        }
    }

    /// Rebuilds a payload from its stored `(message_type, metadata)` pair.
    pub fn from_parts(message_type: MessageType, metadata: Value) -> Result<Self, DomainError> {
        match message_type {
            MessageType::Text => Ok(Self::Text(metadata)),
            MessageType::Image => Ok(Self::Image(metadata)),
            MessageType::ProductShare => Ok(Self::ProductShare(metadata)),
            MessageType::DesignShare => Ok(Self::DesignShare(metadata)),
            MessageType::OrderRequest => serde_json::from_value::<OrderRequestEnvelope>(metadata)
                .map(|envelope| Self::OrderRequest(envelope.order_details))
                .map_err(|err| {
                    DomainError::ValidationError(format!("invalid order request metadata: {err}"))
                }),
            MessageType::OrderResponse => serde_json::from_value::<OrderResponseDetails>(metadata)
                .map(Self::OrderResponse)
                .map_err(|err| {
                    DomainError::ValidationError(format!("invalid order response metadata: {err}"))
                }),
        }
    }

    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Text(_) => MessageType::Text,
            Self::Image(_) => MessageType::Image,
            Self::ProductShare(_) => MessageType::ProductShare,
            Self::DesignShare(_) => MessageType::DesignShare,
            Self::OrderRequest(_) => MessageType::OrderRequest,
            Self::OrderResponse(_) => MessageType::OrderResponse,
        }
    }

    pub fn to_metadata(&self) -> Value {
        match self {
            Self::Text(value)
            | Self::Image(value)
            | Self::ProductShare(value)
            | Self::DesignShare(value) => value.clone(),
            Self::OrderRequest(details) => serde_json::json!({ "order_details": details }),
            Self::OrderResponse(details) => serde_json::to_value(details).unwrap_or(Value::Null),
        }
    }

    pub fn as_order_request(&self) -> Option<&OrderRequestDetails> {
        match self {
            Self::OrderRequest(details) => Some(details),
            _ => None,
        }
    }

    pub fn as_order_response(&self) -> Option<&OrderResponseDetails> {
        match self {
            Self::OrderResponse(details) => Some(details),
            _ => None,
        }
    }
}

fn empty_metadata() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub payload: MessagePayload,
    pub attachments: Vec<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        conversation_id: Uuid,
        sender_id: Uuid,
        content: impl Into<String>,
        payload: MessagePayload,
        attachments: Vec<String>,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "message content is required".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content,
            payload,
            attachments,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        })
    }

    pub const fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    /// The order request this message answers, if it is an order response.
    pub fn responds_to(&self) -> Option<Uuid> {
        self.payload
            .as_order_response()
            .map(|details| details.original_message_id)
    }
}

/// Lifecycle of an order request, derived from the message log rather than
/// stored: a request is pending until an order response references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderRequestState {
    Pending,
    Accepted,
    Declined,
}

impl OrderRequestState {
    pub fn from_response(response: Option<&Message>) -> Self {
        match response.and_then(|message| message.payload.as_order_response()) {
            None => Self::Pending,
            Some(details) if details.accepted => Self::Accepted,
            Some(_) => Self::Declined,
        }
    }
}
