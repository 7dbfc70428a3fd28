//! Room message entity and repository trait.
//!
//! Maps to the `room_messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::membership::MembershipGuard;
use crate::shared::error::AppError;

/// A message posted to a room.
///
/// Maps to the `room_messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - room_id: BIGINT NOT NULL REFERENCES rooms(id) ON DELETE CASCADE
/// - sender_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - content: TEXT NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMessage {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl RoomMessage {
    pub fn new(id: i64, room_id: i64, sender_id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            room_id,
            sender_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for RoomMessage data access operations.
#[async_trait]
pub trait RoomMessageRepository: Send + Sync {
    /// Find a message by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<RoomMessage>, AppError>;

    /// Messages of one room, oldest first.
    async fn list_by_room(&self, room_id: i64) -> Result<Vec<RoomMessage>, AppError>;

    /// Messages of every room `user_id` belongs to, newest first.
    async fn list_for_member(&self, user_id: i64) -> Result<Vec<RoomMessage>, AppError>;

    /// Insert `message` after `guard` approves the sender's membership in the
    /// message's room, read in the same transaction as the insert.
    async fn create_guarded(&self, message: &RoomMessage, guard: MembershipGuard) -> Result<RoomMessage, AppError>;

    /// Delete `message` after `guard` approves the acting user's membership
    /// in the message's room, all in one transaction.
    async fn delete_guarded(
        &self,
        message: &RoomMessage,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<(), AppError>;
}
