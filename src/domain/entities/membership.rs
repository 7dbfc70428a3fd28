//! Room membership entity and repository trait.
//!
//! Maps to the `room_memberships` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A user's membership in a room.
///
/// Maps to the `room_memberships` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - room_id: BIGINT NOT NULL REFERENCES rooms(id) ON DELETE CASCADE
/// - user_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - joined_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - UNIQUE (room_id, user_id)
///
/// The existence of this row is the only thing that grants access to a
/// room, its roster and its messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(id: i64, room_id: i64, user_id: i64) -> Self {
        Self {
            id,
            room_id,
            user_id,
            joined_at: Utc::now(),
        }
    }

    /// Whether this membership puts `user_id` in `room_id`.
    pub fn grants(&self, user_id: i64, room_id: i64) -> bool {
        self.user_id == user_id && self.room_id == room_id
    }
}

/// Policy check run inside a store transaction.
///
/// Receives the acting user's membership in the target room, read inside the
/// same transaction as the write it protects. Returning `Err` aborts and rolls
/// back the transaction.
pub type MembershipGuard = Box<dyn FnOnce(Option<&Membership>) -> Result<(), AppError> + Send>;

/// Repository trait for Membership data access operations.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find a membership by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, AppError>;

    /// Find the membership of `user_id` in `room_id`.
    async fn find(&self, room_id: i64, user_id: i64) -> Result<Option<Membership>, AppError>;

    /// Memberships of every room `user_id` belongs to, most recently joined first.
    async fn list_visible_to(&self, user_id: i64) -> Result<Vec<Membership>, AppError>;

    /// Memberships of a single room, most recently joined first.
    async fn list_by_room(&self, room_id: i64) -> Result<Vec<Membership>, AppError>;

    /// Number of members in a room.
    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError>;

    /// Insert `membership` after `guard` approves the acting user's
    /// membership in the same room, all in one transaction.
    ///
    /// Fails with `Conflict` if the user already belongs to the room.
    async fn create_guarded(
        &self,
        membership: &Membership,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<Membership, AppError>;

    /// Delete `membership` after `guard` approves the acting user's
    /// membership in the same room, all in one transaction.
    ///
    /// Fails with `NotFound` if the membership disappeared meanwhile.
    async fn delete_guarded(
        &self,
        membership: &Membership,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<(), AppError>;
}
