// src/db/chat_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::chat::{ChatMessage, Conversation, UnreadCount},
};

#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
        attachment_url: Option<&str>,
    ) -> Result<ChatMessage, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (sender_id, receiver_id, content, attachment_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(attachment_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Página de mensagens entre dois usuários, da mais nova para a mais antiga.
    pub async fn list_between(
        &self,
        user_id: Uuid,
        partner_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM chat_messages
            WHERE ((sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1))
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(partner_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            WITH ultimas AS (
                SELECT DISTINCT ON (CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END)
                       CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS partner_id,
                       content, sender_id, created_at
                FROM chat_messages
                WHERE sender_id = $1 OR receiver_id = $1
                ORDER BY CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END, created_at DESC
            )
            SELECT c.partner_id,
                   u.name AS partner_name,
                   u.avatar_url AS partner_avatar_url,
                   c.content AS last_message,
                   c.sender_id AS last_sender_id,
                   c.created_at AS last_message_at,
                   (SELECT COUNT(*) FROM chat_messages m
                     WHERE m.sender_id = c.partner_id AND m.receiver_id = $1 AND m.read_at IS NULL
                   ) AS unread_count
            FROM ultimas c
            JOIN users u ON u.id = c.partner_id
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    pub async fn unread_counts(&self, user_id: Uuid) -> Result<Vec<UnreadCount>, AppError> {
        let counts = sqlx::query_as::<_, UnreadCount>(
            r#"
            SELECT sender_id, COUNT(*) AS count
            FROM chat_messages
            WHERE receiver_id = $1 AND read_at IS NULL
            GROUP BY sender_id
            ORDER BY sender_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Marca como lidas as mensagens que `partner_id` mandou para `user_id`.
    pub async fn mark_read(&self, user_id: Uuid, partner_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_messages SET read_at = NOW()
            WHERE receiver_id = $1 AND sender_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(partner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Apaga a mensagem se `sender_id` for o autor.
    pub async fn delete_own(&self, message_id: Uuid, sender_id: Uuid) -> Result<Option<ChatMessage>, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            "DELETE FROM chat_messages WHERE id = $1 AND sender_id = $2 RETURNING *",
        )
        .bind(message_id)
        .bind(sender_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn exists(&self, message_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM chat_messages WHERE id = $1)")
            .bind(message_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
