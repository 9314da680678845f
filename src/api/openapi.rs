use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::dtos;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Conversation endpoints
        crate::api::routes::conversations::start_conversation,
        crate::api::routes::conversations::list_conversations,
        crate::api::routes::conversations::unread_count,
        crate::api::routes::conversations::get_conversation,
        crate::api::routes::conversations::send_message,
        crate::api::routes::conversations::archive_conversation,
        // Order negotiation endpoints
        crate::api::routes::conversations::send_order_request,
        crate::api::routes::conversations::respond_to_order,
        crate::api::routes::conversations::list_orders,
        // Health check
        crate::api::routes::system::health,
        crate::api::routes::system::ready,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::PaginationMeta,
            dtos::StartConversationRequest,
            dtos::SendMessageRequest,
            dtos::PriceRangeDto,
            dtos::SendOrderRequestRequest,
            dtos::RespondToOrderRequest,
            dtos::ParticipantResponse,
            dtos::MessageResponse,
            dtos::ConversationResponse,
            dtos::StartConversationResponse,
            dtos::ConversationListResponse,
            dtos::ConversationDetailResponse,
            dtos::UnreadCountResponse,
            dtos::OrderItemResponse,
            dtos::OrderResponse,
            dtos::RespondToOrderResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "conversations", description = "Customer and artisan conversations"),
        (name = "orders", description = "Order requests, responses and the orders they create"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "Craft Market API",
        version = "0.1.0",
        description = "Conversation and order negotiation backend for the craft marketplace",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn api_doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
