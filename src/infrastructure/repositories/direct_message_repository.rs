//! Direct Message Repository Implementation
//!
//! PostgreSQL implementation of the DirectMessageRepository trait.
//! Every read is scoped to a participant in the WHERE clause, so a message
//! outside the caller's conversations is indistinguishable from a missing one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{DirectMessage, DirectMessageRepository};
use crate::infrastructure::database::map_write_error;
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct DirectMessageRow {
    id: i64,
    sender_id: i64,
    receiver_id: i64,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl DirectMessageRow {
    fn into_message(self) -> DirectMessage {
        DirectMessage {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL direct message repository.
#[derive(Clone)]
pub struct PgDirectMessageRepository {
    pool: PgPool,
}

impl PgDirectMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectMessageRepository for PgDirectMessageRepository {
    async fn create(&self, message: &DirectMessage) -> Result<DirectMessage, AppError> {
        let row = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            INSERT INTO direct_messages (id, sender_id, receiver_id, content, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, sender_id, receiver_id, content, is_read, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Message already exists"))?;

        Ok(row.into_message())
    }

    async fn find_for_participant(&self, id: i64, user_id: i64) -> Result<Option<DirectMessage>, AppError> {
        let row = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, is_read, created_at
            FROM direct_messages
            WHERE id = $1 AND (sender_id = $2 OR receiver_id = $2)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DirectMessageRow::into_message))
    }

    async fn list_for_participant(&self, user_id: i64) -> Result<Vec<DirectMessage>, AppError> {
        let rows = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, is_read, created_at
            FROM direct_messages
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DirectMessageRow::into_message).collect())
    }

    async fn list_conversation(&self, user_id: i64, other_user_id: i64) -> Result<Vec<DirectMessage>, AppError> {
        let rows = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, is_read, created_at
            FROM direct_messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DirectMessageRow::into_message).collect())
    }

    async fn mark_read(&self, id: i64, receiver_id: i64) -> Result<Option<DirectMessage>, AppError> {
        let row = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            UPDATE direct_messages
            SET is_read = TRUE
            WHERE id = $1 AND receiver_id = $2
            RETURNING id, sender_id, receiver_id, content, is_read, created_at
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DirectMessageRow::into_message))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM direct_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Message with id {} not found", id)));
        }

        Ok(())
    }
}
