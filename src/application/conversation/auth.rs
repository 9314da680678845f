use uuid::Uuid;

use crate::domain::{Conversation, ParticipantRole};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{ConversationRepository, UserRepository};

/// Loads a conversation the actor takes part in. Missing conversations and
/// conversations the actor is not part of are indistinguishable.
pub async fn load_for_participant(
    conversation_repo: &dyn ConversationRepository,
    actor_user_id: Uuid,
    conversation_id: Uuid,
) -> AppResult<Conversation> {
    let conversation = conversation_repo
        .find_by_id(conversation_id)
        .await?
        .ok_or_else(AppError::conversation_not_found)?;

    if !conversation.is_participant(actor_user_id) {
        return Err(AppError::conversation_not_found());
    }

    Ok(conversation)
}

pub fn require_customer(conversation: &Conversation, actor_user_id: Uuid) -> AppResult<()> {
    match conversation.role_of(actor_user_id) {
        Some(ParticipantRole::Customer) => Ok(()),
        _ => Err(AppError::Forbidden(
            "only the customer can send order requests".to_string(),
        )),
    }
}

/// The actor must be the artisan participant and own the conversation's
/// artisan profile.
pub async fn require_owning_artisan(
    user_repo: &dyn UserRepository,
    conversation: &Conversation,
    actor_user_id: Uuid,
) -> AppResult<()> {
    let forbidden = || {
        AppError::Forbidden("only the artisan in this conversation can respond to orders".to_string())
    };

    if conversation.role_of(actor_user_id) != Some(ParticipantRole::Artisan) {
        return Err(forbidden());
    }

    let profile = user_repo
        .find_artisan_profile(conversation.artisan_profile_id)
        .await?
        .ok_or_else(forbidden)?;

    if profile.user_id != actor_user_id {
        return Err(forbidden());
    }

    Ok(())
}
