//! Direct message entity and repository trait.
//!
//! Maps to the `direct_messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A private message between two users.
///
/// Maps to the `direct_messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - sender_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - receiver_id: BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// - content: TEXT NOT NULL
/// - is_read: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl DirectMessage {
    /// A fresh, unread message.
    pub fn new(id: i64, sender_id: i64, receiver_id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            sender_id,
            receiver_id,
            content: content.into(),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Whether `user_id` sent or received this message.
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// Repository trait for DirectMessage data access operations.
///
/// Every lookup is scoped by the caller so that messages the caller is not a
/// party to are indistinguishable from messages that do not exist.
#[async_trait]
pub trait DirectMessageRepository: Send + Sync {
    /// Store a new message.
    async fn create(&self, message: &DirectMessage) -> Result<DirectMessage, AppError>;

    /// Find a message only if `user_id` is its sender or receiver.
    async fn find_for_participant(&self, id: i64, user_id: i64) -> Result<Option<DirectMessage>, AppError>;

    /// Messages sent or received by `user_id`, newest first.
    async fn list_for_participant(&self, user_id: i64) -> Result<Vec<DirectMessage>, AppError>;

    /// Messages exchanged between two users, oldest first.
    async fn list_conversation(&self, user_id: i64, other_user_id: i64) -> Result<Vec<DirectMessage>, AppError>;

    /// Set `is_read` on a message addressed to `receiver_id`.
    ///
    /// Returns `None` when no such message is addressed to that receiver.
    async fn mark_read(&self, id: i64, receiver_id: i64) -> Result<Option<DirectMessage>, AppError>;

    /// Delete a message.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
