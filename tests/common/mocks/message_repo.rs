use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use craft_market_backend::domain::{Message, Order};
use craft_market_backend::error::{AppError, AppResult};
use craft_market_backend::infrastructure::repositories::MessageRepository;
use uuid::Uuid;

use super::MemoryStore;

pub struct MockMessageRepo {
    pub store: Arc<MemoryStore>,
}

impl MockMessageRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MessageRepository for MockMessageRepo {
    async fn append(&self, message: &Message) -> AppResult<Message> {
        let mut state = self.store.lock();
        if !state
            .conversations
            .iter()
            .any(|c| c.id == message.conversation_id)
        {
            return Err(AppError::BadRequest(
                "referenced resource does not exist".to_string(),
            ));
        }
        state.messages.push(message.clone());
        state.advance_activity(message.conversation_id, message.id, message.created_at);
        Ok(message.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Message>> {
        Ok(self.store.lock().messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list_for_conversation(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Message>, i64)> {
        let mut messages = self.store.messages_in(conversation_id);
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = messages.len() as i64;
        let page = messages
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn mark_read_except(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut state = self.store.lock();
        let mut marked = 0;
        for message in state.messages.iter_mut().filter(|m| {
            m.conversation_id == conversation_id
                && m.sender_id != reader_id
                && !m.is_read
                && m.created_at <= as_of
        }) {
            message.is_read = true;
            message.read_at = Some(as_of);
            marked += 1;
        }
        Ok(marked)
    }

    async fn count_unread_except(
        &self,
        conversation_id: Uuid,
        excluded_user_id: Uuid,
    ) -> AppResult<i64> {
        Ok(self
            .store
            .lock()
            .messages
            .iter()
            .filter(|m| {
                m.conversation_id == conversation_id && m.sender_id != excluded_user_id && !m.is_read
            })
            .count() as i64)
    }

    async fn count_unread_for_user(&self, user_id: Uuid) -> AppResult<i64> {
        let state = self.store.lock();
        Ok(state
            .messages
            .iter()
            .filter(|m| {
                m.sender_id != user_id
                    && !m.is_read
                    && state.is_participant(m.conversation_id, user_id)
            })
            .count() as i64)
    }

    async fn find_response_to(&self, original_message_id: Uuid) -> AppResult<Option<Message>> {
        Ok(self
            .store
            .lock()
            .messages
            .iter()
            .find(|m| m.responds_to() == Some(original_message_id))
            .cloned())
    }

    async fn record_order_response(
        &self,
        response: &Message,
        order: Option<&Order>,
    ) -> AppResult<(Message, Option<Order>)> {
        if order.is_some() && MemoryStore::take_flag(&self.store.fail_next_order_write) {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "order insert failed"
            )));
        }

        let mut state = self.store.lock();
        let original = response.responds_to();
        if state
            .messages
            .iter()
            .any(|m| original.is_some() && m.responds_to() == original)
        {
            return Err(AppError::Conflict(
                "order request has already been answered".to_string(),
            ));
        }

        if let Some(order) = order {
            state.orders.push(order.clone());
            if let Some(conversation) = state
                .conversations
                .iter_mut()
                .find(|c| c.id == response.conversation_id)
            {
                conversation.order_ids.push(order.id);
            }
        }
        state.messages.push(response.clone());
        state.advance_activity(response.conversation_id, response.id, response.created_at);
        Ok((response.clone(), order.cloned()))
    }
}
