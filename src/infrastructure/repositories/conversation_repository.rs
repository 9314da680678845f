use super::message_repository::insert_message;
use super::traits::ConversationRepository;
use crate::domain::{
    Conversation, ConversationParticipant, ConversationPriority, ConversationStatus, Message,
};
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const CONVERSATION_COLUMNS: &str = "c.id, c.artisan_profile_id, c.customer_user_id, c.subject, \
    c.status, c.last_message_id, c.last_activity_at, c.related_product_id, c.related_design_id, \
    c.order_ids, c.priority, c.created_at, c.updated_at";

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    artisan_profile_id: Uuid,
    customer_user_id: Uuid,
    subject: String,
    status: ConversationStatus,
    last_message_id: Option<Uuid>,
    last_activity_at: DateTime<Utc>,
    related_product_id: Option<Uuid>,
    related_design_id: Option<Uuid>,
    order_ids: Vec<Uuid>,
    priority: ConversationPriority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationRow {
    fn into_conversation(self, participants: Vec<ConversationParticipant>) -> Conversation {
        Conversation {
            id: self.id,
            participants,
            artisan_profile_id: self.artisan_profile_id,
            customer_user_id: self.customer_user_id,
            subject: self.subject,
            status: self.status,
            last_message_id: self.last_message_id,
            last_activity_at: self.last_activity_at,
            related_product_id: self.related_product_id,
            related_design_id: self.related_design_id,
            order_ids: self.order_ids,
            priority: self.priority,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub struct ConversationRepositoryImpl {
    pool: PgPool,
}

impl ConversationRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Moves the conversation's last-message pointer forward. Never rewinds it.
pub(super) async fn advance_activity(
    conn: &mut PgConnection,
    conversation_id: Uuid,
    message_id: Uuid,
    at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE conversations
        SET last_message_id = $2,
            last_activity_at = $3,
            updated_at = NOW()
        WHERE id = $1 AND (last_message_id IS NULL OR last_activity_at <= $3)
        "#,
    )
    .bind(conversation_id)
    .bind(message_id)
    .bind(at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn attach_participants(
    conn: &mut PgConnection,
    rows: Vec<ConversationRow>,
) -> AppResult<Vec<Conversation>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let participants = sqlx::query_as::<_, ConversationParticipant>(
        r#"
        SELECT conversation_id, user_id, role, joined_at, last_seen_at
        FROM conversation_participants
        WHERE conversation_id = ANY($1)
        ORDER BY conversation_id, role
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_conversation: HashMap<Uuid, Vec<ConversationParticipant>> = HashMap::new();
    for participant in participants {
        by_conversation
            .entry(participant.conversation_id)
            .or_default()
            .push(participant);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let participants = by_conversation.remove(&row.id).unwrap_or_default();
            row.into_conversation(participants)
        })
        .collect())
}

async fn load_conversation(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Conversation>> {
    let row = sqlx::query_as::<_, ConversationRow>(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations c WHERE c.id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(attach_participants(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

#[async_trait]
impl ConversationRepository for ConversationRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let mut conn = self.pool.acquire().await?;
        load_conversation(&mut conn, id).await
    }

    async fn find_active_between(
        &self,
        customer_user_id: Uuid,
        artisan_profile_id: Uuid,
    ) -> AppResult<Option<Conversation>> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations c
            WHERE c.customer_user_id = $1
              AND c.artisan_profile_id = $2
              AND c.status = 'active'
            "#
        ))
        .bind(customer_user_id)
        .bind(artisan_profile_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(attach_participants(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_with_message(
        &self,
        conversation: &Conversation,
        first_message: &Message,
    ) -> AppResult<(Conversation, Message)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, artisan_profile_id, customer_user_id, subject, status, last_activity_at,
                related_product_id, related_design_id, order_ids, priority, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.artisan_profile_id)
        .bind(conversation.customer_user_id)
        .bind(&conversation.subject)
        .bind(conversation.status)
        .bind(conversation.last_activity_at)
        .bind(conversation.related_product_id)
        .bind(conversation.related_design_id)
        .bind(&conversation.order_ids)
        .bind(conversation.priority)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&mut *tx)
        .await?;

        for participant in &conversation.participants {
            sqlx::query(
                r#"
                INSERT INTO conversation_participants (conversation_id, user_id, role, joined_at, last_seen_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(conversation.id)
            .bind(participant.user_id)
            .bind(participant.role)
            .bind(participant.joined_at)
            .bind(participant.last_seen_at)
            .execute(&mut *tx)
            .await?;
        }

        let message = insert_message(&mut tx, first_message).await?;
        advance_activity(&mut tx, conversation.id, message.id, message.created_at).await?;
        let created = load_conversation(&mut tx, conversation.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("conversation vanished inside its own transaction"))?;

        tx.commit().await?;
        Ok((created, message))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ConversationStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Conversation>, i64)> {
        let mut conn = self.pool.acquire().await?;
        let visible = r#"
            EXISTS (
                SELECT 1 FROM conversation_participants cp
                WHERE cp.conversation_id = c.id AND cp.user_id = $1
            )
            AND ($2::conversation_status IS NULL OR c.status = $2)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM conversations c WHERE {visible}"
        ))
        .bind(user_id)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations c
            WHERE {visible}
            ORDER BY c.last_activity_at DESC, c.id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let conversations = attach_participants(&mut conn, rows).await?;
        Ok((conversations, total))
    }

    async fn update_last_activity(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        advance_activity(&mut conn, conversation_id, message_id, at).await
    }

    async fn archive(&self, conversation_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE conversations SET status = 'archived', updated_at = NOW() WHERE id = $1 AND status <> 'archived'",
        )
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch_participant_last_seen(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE conversation_participants
            SET last_seen_at = GREATEST(COALESCE(last_seen_at, $3), $3)
            WHERE conversation_id = $1 AND user_id = $2
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
