use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{auth, mapper, ConversationService};
use crate::api::dtos::{
    MessageResponse, OrderResponse, RespondToOrderRequest, RespondToOrderResponse,
    SendOrderRequestRequest,
};
use crate::domain::{
    check_amount, Message, MessagePayload, Order, OrderRequestDetails, OrderRequestState, OrderResponseDetails,
    PriceRange,
};
use crate::error::{AppError, AppResult};

const ACCEPTED_CONTENT: &str = "Order accepted!";
const DECLINED_CONTENT: &str = "Order declined";

impl ConversationService {
    /// Customer proposes an order for one of the artisan's products.
    pub async fn send_order_request(
        &self,
        actor_user_id: Uuid,
        conversation_id: Uuid,
        request: SendOrderRequestRequest,
    ) -> AppResult<MessageResponse> {
        request.validate()?;

        let conversation = auth::load_for_participant(
            self.conversation_repo.as_ref(),
            actor_user_id,
            conversation_id,
        )
        .await?;
        auth::require_customer(&conversation, actor_user_id)?;
        conversation.ensure_accepts_messages()?;

        let product = self
            .product_repo
            .find_by_id(request.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

        if !product.is_offered_by(conversation.artisan_profile_id) {
            return Err(AppError::ProductNotAvailable(
                "product is not available from this artisan".to_string(),
            ));
        }

        let estimated_price = match request.requested_price {
            Some(requested) => {
                let range = PriceRange {
                    min: requested.min,
                    max: requested.max,
                };
                range.validate()?;
                range
            }
            None => {
                let estimate = product.estimate_for(request.quantity);
                if estimate.validate().is_err() {
                    return Err(AppError::validation_error(
                        "quantity times base price exceeds the maximum order amount",
                    ));
                }
                estimate
            }
        };

        let content = non_blank(request.message)
            .unwrap_or_else(|| format!("I would like to order {}", product.name));
        self.ensure_content_length(&content)?;

        let details = OrderRequestDetails {
            product_id: product.id,
            quantity: request.quantity,
            customization: request.customization,
            specifications: request.specifications,
            estimated_price,
            timeline: request.timeline,
        };
        let message = Message::new(
            conversation_id,
            actor_user_id,
            content,
            MessagePayload::OrderRequest(details),
            Vec::new(),
        )?;
        let created = self.message_repo.append(&message).await?;

        info!(
            conversation_id = %conversation_id,
            message_id = %created.id,
            product_id = %product.id,
            quantity = request.quantity,
            "order request sent"
        );

        Ok(mapper::map_message_to_response(
            created,
            Some(OrderRequestState::Pending),
        ))
    }

    /// Artisan accepts or declines a pending order request. Acceptance creates
    /// a confirmed order in the same unit of work as the response message.
    pub async fn respond_to_order(
        &self,
        actor_user_id: Uuid,
        conversation_id: Uuid,
        request: RespondToOrderRequest,
    ) -> AppResult<RespondToOrderResponse> {
        request.validate()?;
        if let Some(price) = request.final_price {
            check_amount("final price", price)?;
        }

        let conversation = auth::load_for_participant(
            self.conversation_repo.as_ref(),
            actor_user_id,
            conversation_id,
        )
        .await?;
        auth::require_owning_artisan(self.user_repo.as_ref(), &conversation, actor_user_id)
            .await?;
        conversation.ensure_accepts_messages()?;

        let not_found = || AppError::NotFound("order request not found".to_string());
        let original = self
            .message_repo
            .find_by_id(request.original_message_id)
            .await?
            .filter(|message| message.conversation_id == conversation_id)
            .ok_or_else(not_found)?;
        let order_request = original.payload.as_order_request().ok_or_else(not_found)?;

        if self
            .message_repo
            .find_response_to(original.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "order request has already been answered".to_string(),
            ));
        }

        let order = request.accepted.then(|| {
            Order::confirmed_from_request(
                conversation.customer_user_id,
                conversation_id,
                conversation.artisan_profile_id,
                order_request,
                request
                    .final_price
                    .unwrap_or(order_request.estimated_price.min),
            )
        });

        let details = OrderResponseDetails {
            order_id: order.as_ref().map(|order| order.id),
            product_id: order_request.product_id,
            original_message_id: original.id,
            accepted: request.accepted,
            final_price: request.final_price,
            estimated_delivery: request.estimated_delivery,
            terms: request.terms,
        };
        let default_content = if request.accepted {
            ACCEPTED_CONTENT
        } else {
            DECLINED_CONTENT
        };
        let content =
            non_blank(request.response_message).unwrap_or_else(|| default_content.to_string());
        self.ensure_content_length(&content)?;

        let message = Message::new(
            conversation_id,
            actor_user_id,
            content,
            MessagePayload::OrderResponse(details),
            Vec::new(),
        )?;
        let (created, order) = self
            .message_repo
            .record_order_response(&message, order.as_ref())
            .await?;

        match &order {
            Some(order) => info!(
                conversation_id = %conversation_id,
                request_id = %original.id,
                order_id = %order.id,
                order_number = %order.order_number,
                "order request accepted"
            ),
            None => info!(
                conversation_id = %conversation_id,
                request_id = %original.id,
                "order request declined"
            ),
        }

        Ok(RespondToOrderResponse {
            message: mapper::map_message_to_response(created, None),
            order: order.map(OrderResponse::from),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
