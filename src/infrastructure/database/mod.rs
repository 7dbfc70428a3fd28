//! Database Module
//!
//! PostgreSQL connection pool, constraint error mapping, and transaction management.

pub mod unit_of_work;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::domain::Membership;
use crate::shared::error::AppError;

pub use unit_of_work::TransactionContext;

/// Create a PostgreSQL connection pool
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
        .connect(&settings.url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Translate constraint violations raised by a write.
///
/// Unique violations become `Conflict(conflict_message)`; foreign key
/// violations mean a referenced row vanished and become `NotFound`.
pub(crate) fn map_write_error(err: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(conflict_message.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound("Referenced record not found".to_string());
        }
    }
    AppError::Database(err)
}

/// Row shape of the `room_memberships` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MembershipRow {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}

impl MembershipRow {
    pub fn into_membership(self) -> Membership {
        Membership {
            id: self.id,
            room_id: self.room_id,
            user_id: self.user_id,
            joined_at: self.joined_at,
        }
    }
}
