//! Membership Repository Implementation
//!
//! PostgreSQL implementation of the MembershipRepository trait.
//!
//! Guarded writes lock the actor's own membership row with `FOR SHARE` before
//! running the guard. A concurrent removal of that membership blocks until the
//! guarded write commits, so an approval never outlives the membership it was
//! based on.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Membership, MembershipGuard, MembershipRepository};
use crate::infrastructure::database::{map_write_error, MembershipRow, TransactionContext};
use crate::shared::error::AppError;

/// PostgreSQL membership repository.
#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, AppError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            "SELECT id, room_id, user_id, joined_at FROM room_memberships WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MembershipRow::into_membership))
    }

    async fn find(&self, room_id: i64, user_id: i64) -> Result<Option<Membership>, AppError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, room_id, user_id, joined_at
            FROM room_memberships
            WHERE room_id = $1 AND user_id = $2
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MembershipRow::into_membership))
    }

    async fn list_visible_to(&self, user_id: i64) -> Result<Vec<Membership>, AppError> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT m.id, m.room_id, m.user_id, m.joined_at
            FROM room_memberships m
            WHERE m.room_id IN (
                SELECT room_id FROM room_memberships WHERE user_id = $1
            )
            ORDER BY m.joined_at DESC, m.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MembershipRow::into_membership).collect())
    }

    async fn list_by_room(&self, room_id: i64) -> Result<Vec<Membership>, AppError> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, room_id, user_id, joined_at
            FROM room_memberships
            WHERE room_id = $1
            ORDER BY joined_at DESC, id DESC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MembershipRow::into_membership).collect())
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM room_memberships WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_guarded(
        &self,
        membership: &Membership,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<Membership, AppError> {
        let mut tx = TransactionContext::begin(&self.pool).await?;
        tx.check_membership(membership.room_id, actor_id, guard).await?;

        let row = sqlx::query_as::<_, MembershipRow>(
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

        Ok(row.into_membership())
    }

    async fn delete_guarded(
        &self,
        membership: &Membership,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<(), AppError> {
        let mut tx = TransactionContext::begin(&self.pool).await?;
        tx.check_membership(membership.room_id, actor_id, guard).await?;

        let result = sqlx::query("DELETE FROM room_memberships WHERE id = $1")
            .bind(membership.id)
            .execute(tx.conn())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Membership with id {} not found", membership.id)));
        }

        tx.commit().await
    }
}
