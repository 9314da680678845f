use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use craft_market_backend::domain::{Conversation, ConversationStatus, Message};
use craft_market_backend::error::{AppError, AppResult};
use craft_market_backend::infrastructure::repositories::ConversationRepository;
use uuid::Uuid;

use super::MemoryStore;

pub struct MockConversationRepo {
    pub store: Arc<MemoryStore>,
}

impl MockConversationRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConversationRepository for MockConversationRepo {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        Ok(self.store.conversation(id))
    }

    async fn find_active_between(
        &self,
        customer_user_id: Uuid,
        artisan_profile_id: Uuid,
    ) -> AppResult<Option<Conversation>> {
        if MemoryStore::take_flag(&self.store.hide_active_once) {
            return Ok(None);
        }
        Ok(self
            .store
            .lock()
            .active_between(customer_user_id, artisan_profile_id)
            .cloned())
    }

    async fn create_with_message(
        &self,
        conversation: &Conversation,
        first_message: &Message,
    ) -> AppResult<(Conversation, Message)> {
        let mut state = self.store.lock();
        if state
            .active_between(conversation.customer_user_id, conversation.artisan_profile_id)
            .is_some()
        {
            return Err(AppError::Conflict(
                "an active conversation with this artisan already exists".to_string(),
            ));
        }

        let mut created = conversation.clone();
        created.last_message_id = Some(first_message.id);
        created.last_activity_at = first_message.created_at;
        state.conversations.push(created.clone());
        state.messages.push(first_message.clone());
        Ok((created, first_message.clone()))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ConversationStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Conversation>, i64)> {
        let mut matching: Vec<Conversation> = self
            .store
            .lock()
            .conversations
            .iter()
            .filter(|c| c.is_participant(user_id))
            .filter(|c| status.map_or(true, |status| c.status == status))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.last_activity_at
                .cmp(&a.last_activity_at)
                .then(b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_last_activity(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.store
            .lock()
            .advance_activity(conversation_id, message_id, at);
        Ok(())
    }

    async fn archive(&self, conversation_id: Uuid) -> AppResult<()> {
        let mut state = self.store.lock();
        if let Some(conversation) = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id && c.status != ConversationStatus::Archived)
        {
            conversation.status = ConversationStatus::Archived;
            conversation.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn touch_participant_last_seen(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.store.lock();
        if let Some(participant) = state
            .conversations
            .iter_mut()
            .filter(|c| c.id == conversation_id)
            .flat_map(|c| c.participants.iter_mut())
            .find(|p| p.user_id == user_id)
        {
            participant.last_seen_at = Some(participant.last_seen_at.map_or(at, |seen| seen.max(at)));
        }
        Ok(())
    }
}
