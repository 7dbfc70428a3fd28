//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a user account in the chat system.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(150) NOT NULL UNIQUE
/// - email: VARCHAR(254) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - is_active: BOOLEAN NOT NULL DEFAULT TRUE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Username (unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Inactive accounts cannot log in
    pub is_active: bool,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new active account.
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: 0,
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual storage interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find every user whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError>;

    /// List all accounts, newest first.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Create a new user. Fails with `Conflict` if the username or email is taken.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update username and email. Fails with `Conflict` on collision.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Set the active flag.
    async fn set_active(&self, id: i64, is_active: bool) -> Result<User, AppError>;

    /// Delete a user; memberships and authored messages cascade.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
