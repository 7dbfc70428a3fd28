//! Room Repository Implementation
//!
//! PostgreSQL implementation of the RoomRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Membership, MembershipGuard, Room, RoomRepository};
use crate::infrastructure::database::{map_write_error, MembershipRow, TransactionContext};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl RoomRow {
    fn into_room(self) -> Room {
        Room {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL room repository.
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>("SELECT id, name, created_at FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(RoomRow::into_room))
    }

    async fn list_for_member(&self, user_id: i64) -> Result<Vec<Room>, AppError> {
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT r.id, r.name, r.created_at
            FROM rooms r
            INNER JOIN room_memberships m ON m.room_id = r.id
            WHERE m.user_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoomRow::into_room).collect())
    }

    /// The room and its first membership are inserted in one transaction.
    async fn create_with_member(&self, room: &Room, membership: &Membership) -> Result<(Room, Membership), AppError> {
        let mut tx = TransactionContext::begin(&self.pool).await?;

        let room_row = sqlx::query_as::<_, RoomRow>(
            r#"
            INSERT INTO rooms (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(room.id)
        .bind(&room.name)
        .bind(room.created_at)
        .fetch_one(tx.conn())
        .await
        .map_err(|e| map_write_error(e, "Room already exists"))?;

        let member_row = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO room_memberships (id, room_id, user_id, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, room_id, user_id, joined_at
            "#,
        )
        .bind(membership.id)
        .bind(membership.room_id)
        .bind(membership.user_id)
        .bind(membership.joined_at)
        .fetch_one(tx.conn())
        .await
        .map_err(|e| map_write_error(e, "User is already a member of this room"))?;

        tx.commit().await?;

        Ok((room_row.into_room(), member_row.into_membership()))
    }

    async fn update_guarded(&self, room: &Room, actor_id: i64, guard: MembershipGuard) -> Result<Room, AppError> {
        let mut tx = TransactionContext::begin(&self.pool).await?;
        tx.check_membership(room.id, actor_id, guard).await?;

        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            UPDATE rooms
            SET name = $2
            WHERE id = $1
            RETURNING id, name, created_at
            "#,
        )
        .bind(room.id)
        .bind(&room.name)
        .fetch_optional(tx.conn())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Room with id {} not found", room.id)))?;

        tx.commit().await?;

        Ok(row.into_room())
    }

    async fn delete_guarded(&self, id: i64, actor_id: i64, guard: MembershipGuard) -> Result<(), AppError> {
        let mut tx = TransactionContext::begin(&self.pool).await?;
        tx.check_membership(id, actor_id, guard).await?;

        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(tx.conn())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Room with id {} not found", id)));
        }

        tx.commit().await
    }
}
