//! Room Message Repository Implementation
//!
//! PostgreSQL implementation of the RoomMessageRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{MembershipGuard, RoomMessage, RoomMessageRepository};
use crate::infrastructure::database::{map_write_error, TransactionContext};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct RoomMessageRow {
    id: i64,
    room_id: i64,
    sender_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl RoomMessageRow {
    fn into_message(self) -> RoomMessage {
        RoomMessage {
            id: self.id,
            room_id: self.room_id,
            sender_id: self.sender_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL room message repository.
#[derive(Clone)]
pub struct PgRoomMessageRepository {
    pool: PgPool,
}

impl PgRoomMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomMessageRepository for PgRoomMessageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<RoomMessage>, AppError> {
        let row = sqlx::query_as::<_, RoomMessageRow>(
            "SELECT id, room_id, sender_id, content, created_at FROM room_messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoomMessageRow::into_message))
    }

    async fn list_by_room(&self, room_id: i64) -> Result<Vec<RoomMessage>, AppError> {
        let rows = sqlx::query_as::<_, RoomMessageRow>(
            r#"
            SELECT id, room_id, sender_id, content, created_at
            FROM room_messages
            WHERE room_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoomMessageRow::into_message).collect())
    }

    async fn list_for_member(&self, user_id: i64) -> Result<Vec<RoomMessage>, AppError> {
        let rows = sqlx::query_as::<_, RoomMessageRow>(
            r#"
            SELECT rm.id, rm.room_id, rm.sender_id, rm.content, rm.created_at
            FROM room_messages rm
            INNER JOIN room_memberships m ON m.room_id = rm.room_id
            WHERE m.user_id = $1
            ORDER BY rm.created_at DESC, rm.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoomMessageRow::into_message).collect())
    }

    async fn create_guarded(&self, message: &RoomMessage, guard: MembershipGuard) -> Result<RoomMessage, AppError> {
        let mut tx = TransactionContext::begin(&self.pool).await?;
        tx.check_membership(message.room_id, message.sender_id, guard).await?;

        let row = sqlx::query_as::<_, RoomMessageRow>(
            r#"
            INSERT INTO room_messages (id, room_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, room_id, sender_id, content, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.room_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.created_at)
        .fetch_one(tx.conn())
        .await
        .map_err(|e| map_write_error(e, "Message already exists"))?;

        tx.commit().await?;

        Ok(row.into_message())
    }

    async fn delete_guarded(
        &self,
        message: &RoomMessage,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<(), AppError> {
        let mut tx = TransactionContext::begin(&self.pool).await?;
        tx.check_membership(message.room_id, actor_id, guard).await?;

        let result = sqlx::query("DELETE FROM room_messages WHERE id = $1")
            .bind(message.id)
            .execute(tx.conn())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Message with id {} not found", message.id)));
        }

        tx.commit().await
    }
}
