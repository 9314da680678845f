use super::conversation_repository::advance_activity;
use super::order_repository::insert_order;
use super::traits::MessageRepository;
use crate::domain::{Message, MessagePayload, MessageType, Order};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, content, message_type, \
    attachments, metadata, is_read, read_at, created_at";

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: String,
    message_type: MessageType,
    attachments: Vec<String>,
    metadata: Json<Value>,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let payload = MessagePayload::from_parts(row.message_type, row.metadata.0).map_err(|err| {
            AppError::InternalError(anyhow::anyhow!(
                "stored message {} has unreadable metadata: {err}",
                row.id
            ))
        })?;
        Ok(Message {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            content: row.content,
            payload,
            attachments: row.attachments,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

fn into_messages(rows: Vec<MessageRow>) -> AppResult<Vec<Message>> {
    rows.into_iter().map(Message::try_from).collect()
}

pub(super) async fn insert_message(conn: &mut PgConnection, message: &Message) -> AppResult<Message> {
    let row = sqlx::query_as::<_, MessageRow>(&format!(
        r#"
        INSERT INTO messages (
            id, conversation_id, sender_id, content, message_type, attachments, metadata,
            responds_to_message_id, is_read, read_at, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {MESSAGE_COLUMNS}
        "#
    ))
    .bind(message.id)
    .bind(message.conversation_id)
    .bind(message.sender_id)
    .bind(&message.content)
    .bind(message.message_type())
    .bind(&message.attachments)
    .bind(Json(message.payload.to_metadata()))
    .bind(message.responds_to())
    .bind(message.is_read)
    .bind(message.read_at)
    .bind(message.created_at)
    .fetch_one(&mut *conn)
    .await?;
    Message::try_from(row)
}

pub struct MessageRepositoryImpl {
    pool: PgPool,
}

impl MessageRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for MessageRepositoryImpl {
    async fn append(&self, message: &Message) -> AppResult<Message> {
        let mut tx = self.pool.begin().await?;
        let created = insert_message(&mut tx, message).await?;
        advance_activity(&mut tx, created.conversation_id, created.id, created.created_at).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Message::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Message>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        into_messages(rows)
    }

    async fn list_for_conversation(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Message>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((into_messages(rows)?, total))
    }

    async fn mark_read_except(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE, read_at = NOW()
            WHERE conversation_id = $1
              AND sender_id <> $2
              AND is_read = FALSE
              AND created_at <= $3
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .bind(as_of)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn count_unread_except(
        &self,
        conversation_id: Uuid,
        excluded_user_id: Uuid,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE conversation_id = $1 AND sender_id <> $2 AND is_read = FALSE
            "#,
        )
        .bind(conversation_id)
        .bind(excluded_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_unread_by_conversation(
        &self,
        user_id: Uuid,
        conversation_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, i64>> {
        if conversation_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT conversation_id, COUNT(*)
            FROM messages
            WHERE conversation_id = ANY($1) AND sender_id <> $2 AND is_read = FALSE
            GROUP BY conversation_id
            "#,
        )
        .bind(conversation_ids)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts: HashMap<Uuid, i64> =
            conversation_ids.iter().map(|id| (*id, 0)).collect();
        counts.extend(rows);
        Ok(counts)
    }

    async fn count_unread_for_user(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages m
            INNER JOIN conversation_participants cp
                ON cp.conversation_id = m.conversation_id AND cp.user_id = $1
            WHERE m.sender_id <> $1 AND m.is_read = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_response_to(&self, original_message_id: Uuid) -> AppResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE responds_to_message_id = $1"
        ))
        .bind(original_message_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Message::try_from).transpose()
    }

    async fn find_responses_to(&self, original_message_ids: &[Uuid]) -> AppResult<Vec<Message>> {
        if original_message_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE responds_to_message_id = ANY($1)"
        ))
        .bind(original_message_ids)
        .fetch_all(&self.pool)
        .await?;
        into_messages(rows)
    }

    async fn record_order_response(
        &self,
        response: &Message,
        order: Option<&Order>,
    ) -> AppResult<(Message, Option<Order>)> {
        let mut tx = self.pool.begin().await?;

        let created_order = match order {
            Some(order) => {
                let created = insert_order(&mut tx, order).await?;
                sqlx::query(
                    r#"
                    UPDATE conversations
                    SET order_ids = array_append(order_ids, $2), updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(response.conversation_id)
                .bind(created.id)
                .execute(&mut *tx)
                .await?;
                Some(created)
            }
            None => None,
        };

        let message = insert_message(&mut tx, response).await?;
        advance_activity(&mut tx, message.conversation_id, message.id, message.created_at).await?;

        tx.commit().await?;
        Ok((message, created_order))
    }
}
