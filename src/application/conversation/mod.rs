use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::api::dtos::{
    page_offset, ConversationDetailResponse, ConversationListParams, ConversationListResponse,
    ConversationResponse, MessageResponse, OrderResponse, PaginationMeta, PaginationParams,
    SendMessageRequest, StartConversationRequest, StartConversationResponse, UnreadCountResponse,
};
use crate::config::MessagingConfig;
use crate::domain::{
    Conversation, ConversationStatus, Message, MessagePayload, MessageType, NewConversation,
    User,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{
    ConversationRepository, MessageRepository, OrderRepository, ProductRepository,
    UserRepository,
};

pub mod auth;
pub mod mapper;
mod orders;

#[derive(Clone)]
pub struct ConversationService {
    user_repo: Arc<dyn UserRepository>,
    product_repo: Arc<dyn ProductRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,
    order_repo: Arc<dyn OrderRepository>,
    settings: MessagingConfig,
}

impl ConversationService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        product_repo: Arc<dyn ProductRepository>,
        conversation_repo: Arc<dyn ConversationRepository>,
        message_repo: Arc<dyn MessageRepository>,
        order_repo: Arc<dyn OrderRepository>,
        settings: MessagingConfig,
    ) -> Self {
        Self {
            user_repo,
            product_repo,
            conversation_repo,
            message_repo,
            order_repo,
            settings,
        }
    }

    /// Opens a thread with an artisan, or appends to the active one if the
    /// pair already has it. The initial message is always stored.
    pub async fn start_conversation(
        &self,
        actor_user_id: Uuid,
        request: StartConversationRequest,
    ) -> AppResult<StartConversationResponse> {
        request.validate()?;
        self.ensure_content_length(&request.initial_message)?;

        let profile = self
            .user_repo
            .find_artisan_profile(request.artisan_profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound("artisan profile not found".to_string()))?;

        if profile.user_id == actor_user_id {
            return Err(AppError::validation_error(
                "cannot start a conversation with your own artisan profile",
            ));
        }

        if let Some(existing) = self
            .conversation_repo
            .find_active_between(actor_user_id, profile.id)
            .await?
        {
            let message = self
                .append_text(existing.id, actor_user_id, request.initial_message)
                .await?;
            info!(
                conversation_id = %existing.id,
                customer_id = %actor_user_id,
                "reused active conversation"
            );
            return self.started(actor_user_id, existing.id, message, false).await;
        }

        let conversation = Conversation::open(
            NewConversation {
                customer_user_id: actor_user_id,
                subject: request.subject,
                related_product_id: request.related_product_id,
                related_design_id: request.related_design_id,
                priority: request.priority.unwrap_or_default(),
            },
            &profile,
        )?;
        let first_message = Message::new(
            conversation.id,
            actor_user_id,
            request.initial_message,
            MessagePayload::text(),
            Vec::new(),
        )?;

        match self
            .conversation_repo
            .create_with_message(&conversation, &first_message)
            .await
        {
            Ok((created, message)) => {
                info!(
                    conversation_id = %created.id,
                    customer_id = %actor_user_id,
                    artisan_profile_id = %profile.id,
                    "conversation started"
                );
                self.started(actor_user_id, created.id, message, true).await
            }
            Err(AppError::Conflict(reason)) => {
                // Another request opened the same pair first; join its thread.
                let winner = self
                    .conversation_repo
                    .find_active_between(actor_user_id, profile.id)
                    .await?
                    .ok_or(AppError::Conflict(reason))?;
                warn!(
                    conversation_id = %winner.id,
                    customer_id = %actor_user_id,
                    "lost race to open conversation, reusing winner"
                );
                let message = self
                    .append_text(winner.id, actor_user_id, first_message.content)
                    .await?;
                self.started(actor_user_id, winner.id, message, false).await
            }
            Err(err) => Err(err),
        }
    }

    pub async fn list_conversations(
        &self,
        actor_user_id: Uuid,
        params: ConversationListParams,
    ) -> AppResult<ConversationListResponse> {
        let status = parse_status_filter(params.status.as_deref())?;
        let page = params.page.unwrap_or(1).max(1);
        let limit = self
            .settings
            .clamp_limit(params.limit, self.settings.default_conversation_page_size);

        let (conversations, total) = self
            .conversation_repo
            .list_for_user(
                actor_user_id,
                status,
                i64::from(limit),
                page_offset(page, limit),
            )
            .await?;

        let conversations = self.summarize(actor_user_id, conversations).await?;
        let pagination = PaginationMeta::new(page, limit, total, conversations.len());
        Ok(ConversationListResponse {
            conversations,
            pagination,
        })
    }

    /// Returns one page of the conversation and marks the other participant's
    /// messages up to now as read. The page shows read flags as they were
    /// before this call.
    pub async fn get_conversation(
        &self,
        actor_user_id: Uuid,
        conversation_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<ConversationDetailResponse> {
        let conversation = auth::load_for_participant(
            self.conversation_repo.as_ref(),
            actor_user_id,
            conversation_id,
        )
        .await?;

        let page = params.page();
        let limit = self
            .settings
            .clamp_limit(params.limit, self.settings.default_message_page_size);
        let as_of = Utc::now();

        let (mut messages, total) = self
            .message_repo
            .list_for_conversation(conversation_id, i64::from(limit), page_offset(page, limit))
            .await?;
        messages.reverse();

        let request_ids: Vec<Uuid> = messages
            .iter()
            .filter(|message| message.message_type() == MessageType::OrderRequest)
            .map(|message| message.id)
            .collect();
        let responses = self.message_repo.find_responses_to(&request_ids).await?;
        let states = mapper::order_states(&messages, &responses);

        let marked = self
            .message_repo
            .mark_read_except(conversation_id, actor_user_id, as_of)
            .await?;
        self.conversation_repo
            .touch_participant_last_seen(conversation_id, actor_user_id, as_of)
            .await?;
        debug!(
            conversation_id = %conversation_id,
            reader_id = %actor_user_id,
            marked,
            "marked messages as read"
        );

        let pagination = PaginationMeta::new(page, limit, total, messages.len());
        let messages = messages
            .into_iter()
            .map(|message| {
                let state = states.get(&message.id).copied();
                mapper::map_message_to_response(message, state)
            })
            .collect();

        let conversation = self
            .summarize(actor_user_id, vec![conversation])
            .await?
            .pop()
            .ok_or_else(AppError::conversation_not_found)?;

        Ok(ConversationDetailResponse {
            conversation,
            messages,
            pagination,
        })
    }

    pub async fn send_message(
        &self,
        actor_user_id: Uuid,
        conversation_id: Uuid,
        request: SendMessageRequest,
    ) -> AppResult<MessageResponse> {
        request.validate()?;
        self.ensure_content_length(&request.content)?;

        let conversation = auth::load_for_participant(
            self.conversation_repo.as_ref(),
            actor_user_id,
            conversation_id,
        )
        .await?;
        conversation.ensure_accepts_messages()?;

        let payload = MessagePayload::generic(
            request.message_type.unwrap_or(MessageType::Text),
            request.metadata,
        )?;
        let message = Message::new(
            conversation_id,
            actor_user_id,
            request.content,
            payload,
            request.attachments,
        )?;
        let created = self.message_repo.append(&message).await?;

        Ok(mapper::map_message_to_response(created, None))
    }

    pub async fn archive_conversation(
        &self,
        actor_user_id: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<()> {
        let conversation = auth::load_for_participant(
            self.conversation_repo.as_ref(),
            actor_user_id,
            conversation_id,
        )
        .await?;

        if conversation.status == ConversationStatus::Archived {
            return Ok(());
        }

        self.conversation_repo.archive(conversation_id).await?;
        info!(
            conversation_id = %conversation_id,
            actor_id = %actor_user_id,
            "conversation archived"
        );
        Ok(())
    }

    pub async fn unread_count(&self, actor_user_id: Uuid) -> AppResult<UnreadCountResponse> {
        let count = self
            .message_repo
            .count_unread_for_user(actor_user_id)
            .await?;
        Ok(UnreadCountResponse { count })
    }

    /// Orders created from accepted requests in this conversation, oldest first.
    pub async fn list_orders(
        &self,
        actor_user_id: Uuid,
        conversation_id: Uuid,
    ) -> AppResult<Vec<OrderResponse>> {
        let conversation = auth::load_for_participant(
            self.conversation_repo.as_ref(),
            actor_user_id,
            conversation_id,
        )
        .await?;

        let orders = self.order_repo.find_by_ids(&conversation.order_ids).await?;
        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    fn ensure_content_length(&self, content: &str) -> AppResult<()> {
        if content.chars().count() > self.settings.max_content_length {
            return Err(AppError::validation_error(format!(
                "content must be at most {} characters",
                self.settings.max_content_length
            )));
        }
        Ok(())
    }

    async fn append_text(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> AppResult<Message> {
        let message = Message::new(
            conversation_id,
            sender_id,
            content,
            MessagePayload::text(),
            Vec::new(),
        )?;
        self.message_repo.append(&message).await
    }

    async fn started(
        &self,
        actor_user_id: Uuid,
        conversation_id: Uuid,
        message: Message,
        created: bool,
    ) -> AppResult<StartConversationResponse> {
        let conversation = self
            .conversation_repo
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(AppError::conversation_not_found)?;
        let conversation = self
            .summarize(actor_user_id, vec![conversation])
            .await?
            .pop()
            .ok_or_else(AppError::conversation_not_found)?;

        Ok(StartConversationResponse {
            conversation,
            message: mapper::map_message_to_response(message, None),
            created,
        })
    }

    /// Decorates conversations with participant profiles, last-message
    /// previews and the actor's unread counts using one batch lookup each.
    async fn summarize(
        &self,
        actor_user_id: Uuid,
        conversations: Vec<Conversation>,
    ) -> AppResult<Vec<ConversationResponse>> {
        if conversations.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids: Vec<Uuid> = conversations
            .iter()
            .flat_map(Conversation::participant_ids)
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let users: HashMap<Uuid, User> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let last_message_ids: Vec<Uuid> = conversations
            .iter()
            .filter_map(|conversation| conversation.last_message_id)
            .collect();
        let mut last_messages: HashMap<Uuid, Message> = self
            .message_repo
            .find_by_ids(&last_message_ids)
            .await?
            .into_iter()
            .map(|message| (message.id, message))
            .collect();

        let conversation_ids: Vec<Uuid> = conversations.iter().map(|c| c.id).collect();
        let unread = self
            .message_repo
            .count_unread_by_conversation(actor_user_id, &conversation_ids)
            .await?;

        Ok(conversations
            .into_iter()
            .map(|conversation| {
                let last_message = conversation
                    .last_message_id
                    .and_then(|id| last_messages.remove(&id));
                let unread_count = unread.get(&conversation.id).copied().unwrap_or(0);
                mapper::map_conversation_to_response(conversation, &users, last_message, unread_count)
            })
            .collect())
    }
}

fn parse_status_filter(raw: Option<&str>) -> AppResult<Option<ConversationStatus>> {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("active") => Ok(Some(ConversationStatus::Active)),
        Some("archived") => Ok(Some(ConversationStatus::Archived)),
        Some("blocked") => Ok(Some(ConversationStatus::Blocked)),
        Some("all") => Ok(None),
        Some(_) => Err(AppError::validation_error(
            "status must be one of: active, archived, blocked, all",
        )),
    }
}
