//! Direct Message Service
//!
//! Private messages between two users. A message is only ever visible to its
//! sender and receiver; lookups outside that pair answer `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::usernames;
use crate::domain::services::{authorize, Action};
use crate::domain::{DirectMessage, DirectMessageRepository, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::require_content;

/// Direct message service trait
#[async_trait]
pub trait DirectMessageService: Send + Sync {
    /// Send `content` from the caller to `receiver_id`.
    async fn send(&self, caller_id: i64, receiver_id: i64, content: &str) -> Result<DirectMessageDto, AppError>;

    /// Every message the caller sent or received, newest first.
    async fn list(&self, caller_id: i64) -> Result<Vec<DirectMessageDto>, AppError>;

    /// The caller's exchange with `other_user_id`, oldest first.
    async fn conversation(&self, caller_id: i64, other_user_id: Option<i64>) -> Result<Vec<DirectMessageDto>, AppError>;

    /// A single message the caller participates in.
    async fn get(&self, caller_id: i64, message_id: i64) -> Result<DirectMessageDto, AppError>;

    /// Flag a message addressed to the caller as read.
    async fn mark_read(&self, caller_id: i64, message_id: i64) -> Result<DirectMessageDto, AppError>;

    /// Delete a message the caller sent.
    async fn delete(&self, caller_id: i64, message_id: i64) -> Result<(), AppError>;
}

/// Direct message with both participants' usernames.
#[derive(Debug, Clone)]
pub struct DirectMessageDto {
    pub id: i64,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// DirectMessageService implementation
pub struct DirectMessageServiceImpl {
    message_repo: Arc<dyn DirectMessageRepository>,
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl DirectMessageServiceImpl {
    pub fn new(
        message_repo: Arc<dyn DirectMessageRepository>,
        user_repo: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            message_repo,
            user_repo,
            id_generator,
        }
    }

    async fn to_dtos(&self, messages: Vec<DirectMessage>) -> Result<Vec<DirectMessageDto>, AppError> {
        let names = usernames(
            self.user_repo.as_ref(),
            messages.iter().flat_map(|m| [m.sender_id, m.receiver_id]),
        )
        .await?;
        let name_of = |id: i64| names.get(&id).cloned().unwrap_or_default();

        Ok(messages
            .into_iter()
            .map(|m| DirectMessageDto {
                id: m.id,
                sender_username: name_of(m.sender_id),
                receiver_username: name_of(m.receiver_id),
                sender_id: m.sender_id,
                receiver_id: m.receiver_id,
                content: m.content,
                is_read: m.is_read,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn to_dto(&self, message: DirectMessage) -> Result<DirectMessageDto, AppError> {
        self.to_dtos(vec![message])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Message vanished while rendering".into()))
    }

    async fn resolve(&self, caller_id: i64, message_id: i64) -> Result<DirectMessage, AppError> {
        self.message_repo
            .find_for_participant(message_id, caller_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".into()))
    }
}

#[async_trait]
impl DirectMessageService for DirectMessageServiceImpl {
    async fn send(&self, caller_id: i64, receiver_id: i64, content: &str) -> Result<DirectMessageDto, AppError> {
        require_content(content)?;

        if self.user_repo.find_by_id(receiver_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "receiver: Invalid pk \"{}\" - object does not exist",
                receiver_id
            )));
        }

        let message = DirectMessage::new(self.id_generator.generate(), caller_id, receiver_id, content);
        authorize(caller_id, Action::Create, &message)?;

        let created = self.message_repo.create(&message).await?;
        tracing::info!(message_id = created.id, sender_id = caller_id, receiver_id, "Direct message sent");

        self.to_dto(created).await
    }

    async fn list(&self, caller_id: i64) -> Result<Vec<DirectMessageDto>, AppError> {
        let messages = self.message_repo.list_for_participant(caller_id).await?;
        self.to_dtos(messages).await
    }

    async fn conversation(&self, caller_id: i64, other_user_id: Option<i64>) -> Result<Vec<DirectMessageDto>, AppError> {
        let other_user_id =
            other_user_id.ok_or_else(|| AppError::Validation("user_id parameter is required".into()))?;

        if self.user_repo.find_by_id(other_user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }

        let messages = self.message_repo.list_conversation(caller_id, other_user_id).await?;
        self.to_dtos(messages).await
    }

    async fn get(&self, caller_id: i64, message_id: i64) -> Result<DirectMessageDto, AppError> {
        let message = self.resolve(caller_id, message_id).await?;
        self.to_dto(message).await
    }

    async fn mark_read(&self, caller_id: i64, message_id: i64) -> Result<DirectMessageDto, AppError> {
        // Scoped to the receiver: the sender and strangers both see NotFound.
        let message = self
            .message_repo
            .mark_read(message_id, caller_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".into()))?;

        tracing::debug!(message_id, user_id = caller_id, "Direct message marked read");
        self.to_dto(message).await
    }

    async fn delete(&self, caller_id: i64, message_id: i64) -> Result<(), AppError> {
        let message = self.resolve(caller_id, message_id).await?;
        authorize(caller_id, Action::Delete, &message)?;

        self.message_repo.delete(message.id).await?;
        tracing::info!(message_id, user_id = caller_id, "Direct message deleted");

        Ok(())
    }
}
