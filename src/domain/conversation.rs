use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{ArtisanProfile, DomainError};

pub const DEFAULT_SUBJECT: &str = "Product Inquiry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "conversation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Archived,
    Blocked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "conversation_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "participant_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Customer,
    Artisan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ConversationParticipant {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub participants: Vec<ConversationParticipant>,
    pub artisan_profile_id: Uuid,
    pub customer_user_id: Uuid,
    pub subject: String,
    pub status: ConversationStatus,
    pub last_message_id: Option<Uuid>,
    pub last_activity_at: DateTime<Utc>,
    pub related_product_id: Option<Uuid>,
    pub related_design_id: Option<Uuid>,
    pub order_ids: Vec<Uuid>,
    pub priority: ConversationPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inputs for a new customer-to-artisan thread.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub customer_user_id: Uuid,
    pub subject: Option<String>,
    pub related_product_id: Option<Uuid>,
    pub related_design_id: Option<Uuid>,
    pub priority: ConversationPriority,
}

impl Conversation {
    pub fn open(draft: NewConversation, artisan: &ArtisanProfile) -> Result<Self, DomainError> {
        if draft.customer_user_id == artisan.user_id {
            return Err(DomainError::ValidationError(
                "cannot start a conversation with your own artisan profile".to_string(),
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let subject = draft
            .subject
            .map(|subject| subject.trim().to_string())
            .filter(|subject| !subject.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let conversation = Self {
            id,
            participants: vec![
                ConversationParticipant {
                    conversation_id: id,
                    user_id: draft.customer_user_id,
                    role: ParticipantRole::Customer,
                    joined_at: now,
                    last_seen_at: Some(now),
                },
                ConversationParticipant {
                    conversation_id: id,
                    user_id: artisan.user_id,
                    role: ParticipantRole::Artisan,
                    joined_at: now,
                    last_seen_at: None,
                },
            ],
            artisan_profile_id: artisan.id,
            customer_user_id: draft.customer_user_id,
            subject,
            status: ConversationStatus::Active,
            last_message_id: None,
            last_activity_at: now,
            related_product_id: draft.related_product_id,
            related_design_id: draft.related_design_id,
            order_ids: Vec::new(),
            priority: draft.priority,
            created_at: now,
            updated_at: now,
        };
        conversation.check_participants()?;
        Ok(conversation)
    }

    /// Exactly one customer and one artisan, and the customer matches
    /// `customer_user_id`.
    pub fn check_participants(&self) -> Result<(), DomainError> {
        let customers = self.participants_with(ParticipantRole::Customer);
        let artisans = self.participants_with(ParticipantRole::Artisan);

        match (customers.as_slice(), artisans.as_slice()) {
            ([customer], [artisan])
                if self.participants.len() == 2
                    && customer.user_id == self.customer_user_id
                    && customer.user_id != artisan.user_id =>
            {
                Ok(())
            }
            _ => Err(DomainError::BusinessRuleViolation(
                "conversation must have exactly one customer and one artisan".to_string(),
            )),
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }

    pub fn role_of(&self, user_id: Uuid) -> Option<ParticipantRole> {
        self.participants
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.role)
    }

    pub fn artisan_user_id(&self) -> Option<Uuid> {
        self.participants_with(ParticipantRole::Artisan)
            .first()
            .map(|p| p.user_id)
    }

    pub fn participant_ids(&self) -> Vec<Uuid> {
        self.participants.iter().map(|p| p.user_id).collect()
    }

    pub fn is_active(&self) -> bool {
        self.status == ConversationStatus::Active
    }

    pub fn ensure_accepts_messages(&self) -> Result<(), DomainError> {
        match self.status {
            ConversationStatus::Active => Ok(()),
            ConversationStatus::Archived => Err(DomainError::BusinessRuleViolation(
                "conversation is archived".to_string(),
            )),
            ConversationStatus::Blocked => Err(DomainError::BusinessRuleViolation(
                "conversation is blocked".to_string(),
            )),
        }
    }

    fn participants_with(&self, role: ParticipantRole) -> Vec<&ConversationParticipant> {
        self.participants.iter().filter(|p| p.role == role).collect()
    }
}
