//! Chat room entity and repository trait.
//!
//! Maps to the `rooms` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::membership::{Membership, MembershipGuard};
use crate::shared::error::AppError;

/// Maximum room name length in characters.
pub const MAX_ROOM_NAME_LENGTH: usize = 255;

/// A group chat room.
///
/// Maps to the `rooms` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(255) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// Rooms have no owner column. Whoever holds a membership may manage the
/// room and its roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for Room data access operations.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find a room by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError>;

    /// Rooms in which `user_id` holds a membership, newest first.
    async fn list_for_member(&self, user_id: i64) -> Result<Vec<Room>, AppError>;

    /// Insert a room together with its first membership.
    ///
    /// Both rows are written in one transaction: if the membership cannot be
    /// stored the room is rolled back as well.
    async fn create_with_member(&self, room: &Room, membership: &Membership) -> Result<(Room, Membership), AppError>;

    /// Rename a room after `guard` approves the acting user's membership in
    /// it, read in the same transaction as the update.
    async fn update_guarded(&self, room: &Room, actor_id: i64, guard: MembershipGuard) -> Result<Room, AppError>;

    /// Delete a room after `guard` approves the acting user's membership in
    /// it; its memberships and messages cascade.
    async fn delete_guarded(&self, id: i64, actor_id: i64, guard: MembershipGuard) -> Result<(), AppError>;
}
