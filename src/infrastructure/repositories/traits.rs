use crate::domain::{
    ArtisanProfile, Conversation, ConversationStatus, Message, Order, Product, User,
};
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.find_by_id(*id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }
    async fn find_artisan_profile(&self, id: Uuid) -> AppResult<Option<ArtisanProfile>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>>;
    async fn find_active_between(
        &self,
        customer_user_id: Uuid,
        artisan_profile_id: Uuid,
    ) -> AppResult<Option<Conversation>>;
    /// Persists a new conversation, its participants and its first message as
    /// one unit. Fails with `Conflict` when an active thread for the same pair
    /// already exists.
    async fn create_with_message(
        &self,
        conversation: &Conversation,
        first_message: &Message,
    ) -> AppResult<(Conversation, Message)>;
    /// Conversations the user participates in, most recently active first,
    /// together with the unpaginated total. `None` means every status.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ConversationStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Conversation>, i64)>;
    async fn update_last_activity(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()>;
    async fn archive(&self, conversation_id: Uuid) -> AppResult<()>;
    async fn touch_participant_last_seen(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Inserts the message and advances the owning conversation's last
    /// message and activity timestamp.
    async fn append(&self, message: &Message) -> AppResult<Message>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Message>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Message>> {
        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(message) = self.find_by_id(*id).await? {
                messages.push(message);
            }
        }
        Ok(messages)
    }
    /// One page, newest first, plus the total message count.
    async fn list_for_conversation(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Message>, i64)>;
    /// Marks every unread message created at or before `as_of` and not sent
    /// by `reader_id` as read. Returns the number of rows flipped.
    async fn mark_read_except(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> AppResult<u64>;
    async fn count_unread_except(
        &self,
        conversation_id: Uuid,
        excluded_user_id: Uuid,
    ) -> AppResult<i64>;
    async fn count_unread_by_conversation(
        &self,
        user_id: Uuid,
        conversation_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, i64>> {
        let mut counts = HashMap::with_capacity(conversation_ids.len());
        for conversation_id in conversation_ids {
            counts.insert(
                *conversation_id,
                self.count_unread_except(*conversation_id, user_id).await?,
            );
        }
        Ok(counts)
    }
    /// Unread messages addressed to the user across every conversation they
    /// participate in, regardless of conversation status.
    async fn count_unread_for_user(&self, user_id: Uuid) -> AppResult<i64>;
    async fn find_response_to(&self, original_message_id: Uuid) -> AppResult<Option<Message>>;
    async fn find_responses_to(&self, original_message_ids: &[Uuid]) -> AppResult<Vec<Message>> {
        let mut responses = Vec::new();
        for id in original_message_ids {
            if let Some(response) = self.find_response_to(*id).await? {
                responses.push(response);
            }
        }
        Ok(responses)
    }
    /// Stores an order response and, when present, the order it confirms as
    /// one unit: the order and its items, the conversation's order list, the
    /// response message and the conversation activity. A second response to
    /// the same request fails with `Conflict` and leaves nothing behind.
    async fn record_order_response(
        &self,
        response: &Message,
        order: Option<&Order>,
    ) -> AppResult<(Message, Option<Order>)>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> AppResult<Order>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;
    /// Orders with the given ids, oldest first. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = self.find_by_id(*id).await? {
                orders.push(order);
            }
        }
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }
}
