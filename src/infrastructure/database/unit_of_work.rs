//! Unit of Work Pattern Implementation
//!
//! Provides transactional boundaries for database operations.
//! Ensures the membership read a policy decision depends on and the write it
//! protects succeed or fail together.
//!
//! Guarded writes lock the room row first and the actor's membership second.
//! The room lock serializes every guarded write in a room, so two members
//! removing each other, or deleting the same room, queue instead of
//! deadlocking.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::MembershipRow;
use crate::domain::{Membership, MembershipGuard};
use crate::shared::error::AppError;

/// Transaction context that wraps a SQLx transaction.
///
/// Dropping the context without calling [`commit`](Self::commit) rolls the
/// transaction back.
pub struct TransactionContext {
    tx: Transaction<'static, Postgres>,
}

impl TransactionContext {
    /// Begin a new transaction on `pool`.
    pub async fn begin(pool: &PgPool) -> Result<Self, AppError> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    /// Connection to run queries on inside this transaction.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Take an exclusive lock on the room row for the rest of the transaction.
    pub async fn lock_room(&mut self, room_id: i64) -> Result<(), AppError> {
        let locked: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM rooms
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(room_id)
        .fetch_optional(self.conn())
        .await?;

        locked
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Room with id {} not found", room_id)))
    }

    /// Read the membership of `user_id` in `room_id`, holding a share lock on
    /// the row until the transaction ends so it cannot be deleted underneath
    /// the decision based on it.
    pub async fn lock_membership(&mut self, room_id: i64, user_id: i64) -> Result<Option<Membership>, AppError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, room_id, user_id, joined_at
            FROM room_memberships
            WHERE room_id = $1 AND user_id = $2
            FOR SHARE
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(self.conn())
        .await?;

        Ok(row.map(MembershipRow::into_membership))
    }

    /// Lock the room, then the actor's membership, and run `guard` against it.
    ///
    /// Answers `NotFound` if the room was deleted before the lock was taken.
    pub async fn check_membership(
        &mut self,
        room_id: i64,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<(), AppError> {
        self.lock_room(room_id).await?;
        let membership = self.lock_membership(room_id, actor_id).await?;
        guard(membership.as_ref())
    }

    /// Commit the transaction.
    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await.map_err(AppError::Database)
    }
}
