//! Room Message Service
//!
//! Messages posted to rooms. Posting, reading and deleting all require a
//! membership in the message's room at the moment of the operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{membership_guard, usernames};
use crate::domain::services::{authorize, Action, RoomScoped};
use crate::domain::{MembershipRepository, Room, RoomMessage, RoomMessageRepository, RoomRepository, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::require_content;

/// Room message service trait
#[async_trait]
pub trait RoomMessageService: Send + Sync {
    /// Post `content` to `room_id` as the caller.
    async fn send(&self, caller_id: i64, room_id: i64, content: &str) -> Result<RoomMessageDto, AppError>;

    /// Messages of every room the caller belongs to, newest first.
    async fn list_visible(&self, caller_id: i64) -> Result<Vec<RoomMessageDto>, AppError>;

    /// Messages of one room, oldest first.
    async fn list_by_room(&self, caller_id: i64, room_id: Option<i64>) -> Result<Vec<RoomMessageDto>, AppError>;

    async fn get(&self, caller_id: i64, message_id: i64) -> Result<RoomMessageDto, AppError>;

    async fn delete(&self, caller_id: i64, message_id: i64) -> Result<(), AppError>;
}

/// Room message with the sender's username and the room's name.
#[derive(Debug, Clone)]
pub struct RoomMessageDto {
    pub id: i64,
    pub room_id: i64,
    pub room_name: String,
    pub sender_id: i64,
    pub sender_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// RoomMessageService implementation
pub struct RoomMessageServiceImpl {
    message_repo: Arc<dyn RoomMessageRepository>,
    room_repo: Arc<dyn RoomRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl RoomMessageServiceImpl {
    pub fn new(
        message_repo: Arc<dyn RoomMessageRepository>,
        room_repo: Arc<dyn RoomRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        user_repo: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            message_repo,
            room_repo,
            membership_repo,
            user_repo,
            id_generator,
        }
    }

    async fn resolve_room(&self, room_id: i64) -> Result<Room, AppError> {
        self.room_repo
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".into()))
    }

    async fn resolve_message(&self, message_id: i64) -> Result<RoomMessage, AppError> {
        self.message_repo
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".into()))
    }

    async fn to_dtos(&self, messages: Vec<RoomMessage>) -> Result<Vec<RoomMessageDto>, AppError> {
        let names = usernames(self.user_repo.as_ref(), messages.iter().map(|m| m.sender_id)).await?;

        let mut room_names: HashMap<i64, String> = HashMap::new();
        for message in &messages {
            if room_names.contains_key(&message.room_id) {
                continue;
            }
            if let Some(room) = self.room_repo.find_by_id(message.room_id).await? {
                room_names.insert(room.id, room.name);
            }
        }

        Ok(messages
            .into_iter()
            .map(|m| RoomMessageDto {
                id: m.id,
                room_name: room_names.get(&m.room_id).cloned().unwrap_or_default(),
                sender_username: names.get(&m.sender_id).cloned().unwrap_or_default(),
                room_id: m.room_id,
                sender_id: m.sender_id,
                content: m.content,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn to_dto(&self, message: RoomMessage) -> Result<RoomMessageDto, AppError> {
        self.to_dtos(vec![message])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Message vanished while rendering".into()))
    }
}

#[async_trait]
impl RoomMessageService for RoomMessageServiceImpl {
    async fn send(&self, caller_id: i64, room_id: i64, content: &str) -> Result<RoomMessageDto, AppError> {
        require_content(content)?;
        let room = self.resolve_room(room_id).await?;

        let message = RoomMessage::new(self.id_generator.generate(), room.id, caller_id, content);
        let guard = membership_guard(caller_id, Action::Create, message.clone());
        let created = self.message_repo.create_guarded(&message, guard).await?;

        tracing::info!(message_id = created.id, room_id, sender_id = caller_id, "Room message sent");
        self.to_dto(created).await
    }

    async fn list_visible(&self, caller_id: i64) -> Result<Vec<RoomMessageDto>, AppError> {
        let messages = self.message_repo.list_for_member(caller_id).await?;
        self.to_dtos(messages).await
    }

    async fn list_by_room(&self, caller_id: i64, room_id: Option<i64>) -> Result<Vec<RoomMessageDto>, AppError> {
        let room_id = room_id.ok_or_else(|| AppError::Validation("room_id parameter is required".into()))?;
        let room = self.resolve_room(room_id).await?;

        let membership = self.membership_repo.find(room.id, caller_id).await?;
        authorize(caller_id, Action::Read, &RoomScoped::new(&room, membership.as_ref()))?;

        let messages = self.message_repo.list_by_room(room.id).await?;
        self.to_dtos(messages).await
    }

    async fn get(&self, caller_id: i64, message_id: i64) -> Result<RoomMessageDto, AppError> {
        let message = self.resolve_message(message_id).await?;
        let membership = self.membership_repo.find(message.room_id, caller_id).await?;
        authorize(caller_id, Action::Read, &RoomScoped::new(&message, membership.as_ref()))?;

        self.to_dto(message).await
    }

    async fn delete(&self, caller_id: i64, message_id: i64) -> Result<(), AppError> {
        let message = self.resolve_message(message_id).await?;

        let guard = membership_guard(caller_id, Action::Delete, message.clone());
        self.message_repo.delete_guarded(&message, caller_id, guard).await?;

        tracing::info!(message_id, room_id = message.room_id, user_id = caller_id, "Room message deleted");
        Ok(())
    }
}
