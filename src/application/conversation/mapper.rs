use std::collections::HashMap;

use uuid::Uuid;

use crate::api::dtos::{ConversationResponse, MessageResponse, ParticipantResponse};
use crate::domain::{Conversation, Message, OrderRequestState, User};

pub fn map_message_to_response(
    message: Message,
    order_state: Option<OrderRequestState>,
) -> MessageResponse {
    let message_type = message.message_type();
    let metadata = message.payload.to_metadata();
    MessageResponse {
        id: message.id,
        conversation_id: message.conversation_id,
        sender_id: message.sender_id,
        content: message.content,
        message_type,
        attachments: message.attachments,
        metadata,
        is_read: message.is_read,
        read_at: message.read_at,
        created_at: message.created_at,
        order_state,
    }
}

pub fn map_conversation_to_response(
    conversation: Conversation,
    users: &HashMap<Uuid, User>,
    last_message: Option<Message>,
    unread_count: i64,
) -> ConversationResponse {
    let participants = conversation
        .participants
        .iter()
        .map(|participant| {
            let user = users.get(&participant.user_id);
            ParticipantResponse {
                user_id: participant.user_id,
                role: participant.role,
                display_name: user.map(User::display_name),
                avatar_url: user.and_then(|user| user.avatar_url.clone()),
                joined_at: participant.joined_at,
                last_seen_at: participant.last_seen_at,
            }
        })
        .collect();

    ConversationResponse {
        id: conversation.id,
        artisan_profile_id: conversation.artisan_profile_id,
        customer_user_id: conversation.customer_user_id,
        subject: conversation.subject,
        status: conversation.status,
        priority: conversation.priority,
        participants,
        last_message: last_message.map(|message| map_message_to_response(message, None)),
        last_activity_at: conversation.last_activity_at,
        related_product_id: conversation.related_product_id,
        related_design_id: conversation.related_design_id,
        order_ids: conversation.order_ids,
        unread_count,
        created_at: conversation.created_at,
        updated_at: conversation.updated_at,
    }
}

/// Derived state for every order request in `messages`, keyed by request id.
pub fn order_states(
    messages: &[Message],
    responses: &[Message],
) -> HashMap<Uuid, OrderRequestState> {
    let responses_by_request: HashMap<Uuid, &Message> = responses
        .iter()
        .filter_map(|response| response.responds_to().map(|id| (id, response)))
        .collect();

    messages
        .iter()
        .filter(|message| message.payload.as_order_request().is_some())
        .map(|message| {
            (
                message.id,
                OrderRequestState::from_response(responses_by_request.get(&message.id).copied()),
            )
        })
        .collect()
}
