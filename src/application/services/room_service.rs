//! Room Service
//!
//! Rooms and their rosters. Access to a room, its roster and its messages is
//! granted solely by holding a membership in it. Any member may add or remove
//! any other member; the creator has no special standing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{membership_guard, usernames};
use crate::domain::services::{authorize, Action, RoomScoped};
use crate::domain::{
    Membership, MembershipRepository, Room, RoomRepository, UserRepository, MAX_ROOM_NAME_LENGTH,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Room service trait
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Create a room with the caller as its first member.
    async fn create_room(&self, caller_id: i64, name: &str) -> Result<RoomDto, AppError>;

    /// Rooms the caller belongs to, newest first.
    async fn list_rooms(&self, caller_id: i64) -> Result<Vec<RoomDto>, AppError>;

    async fn get_room(&self, caller_id: i64, room_id: i64) -> Result<RoomDto, AppError>;

    async fn rename_room(&self, caller_id: i64, room_id: i64, name: &str) -> Result<RoomDto, AppError>;

    /// Delete a room along with its roster and messages.
    async fn delete_room(&self, caller_id: i64, room_id: i64) -> Result<(), AppError>;

    /// Add `user_id` to `room_id` on behalf of the caller.
    async fn add_member(&self, caller_id: i64, room_id: i64, user_id: i64) -> Result<MembershipDto, AppError>;

    /// Remove a membership. Members may remove anyone; anyone may leave.
    async fn remove_member(&self, caller_id: i64, membership_id: i64) -> Result<(), AppError>;

    /// Memberships of every room the caller belongs to, or of one such room.
    async fn list_memberships(&self, caller_id: i64, room_id: Option<i64>) -> Result<Vec<MembershipDto>, AppError>;

    async fn get_membership(&self, caller_id: i64, membership_id: i64) -> Result<MembershipDto, AppError>;
}

/// Room with its current member count.
#[derive(Debug, Clone)]
pub struct RoomDto {
    pub id: i64,
    pub name: String,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Membership with the member's username and the room's name.
#[derive(Debug, Clone)]
pub struct MembershipDto {
    pub id: i64,
    pub room_id: i64,
    pub room_name: String,
    pub user_id: i64,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

/// RoomService implementation
pub struct RoomServiceImpl {
    room_repo: Arc<dyn RoomRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

fn validate_room_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name: This field may not be blank".into()));
    }
    if name.chars().count() > MAX_ROOM_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "name: Ensure this field has no more than {} characters",
            MAX_ROOM_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

impl RoomServiceImpl {
    pub fn new(
        room_repo: Arc<dyn RoomRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        user_repo: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
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

    async fn resolve_membership(&self, membership_id: i64) -> Result<Membership, AppError> {
        self.membership_repo
            .find_by_id(membership_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".into()))
    }

    /// Resolve a room and require the caller to be one of its members.
    async fn room_for_member(&self, caller_id: i64, room_id: i64, action: Action) -> Result<Room, AppError> {
        let room = self.resolve_room(room_id).await?;
        let membership = self.membership_repo.find(room.id, caller_id).await?;
        authorize(caller_id, action, &RoomScoped::new(&room, membership.as_ref()))?;
        Ok(room)
    }

    async fn room_dto(&self, room: Room) -> Result<RoomDto, AppError> {
        let member_count = self.membership_repo.count_by_room(room.id).await?;
        Ok(RoomDto {
            id: room.id,
            name: room.name,
            member_count,
            created_at: room.created_at,
        })
    }

    async fn membership_dtos(&self, memberships: Vec<Membership>) -> Result<Vec<MembershipDto>, AppError> {
        let names = usernames(self.user_repo.as_ref(), memberships.iter().map(|m| m.user_id)).await?;

        let mut room_names: HashMap<i64, String> = HashMap::new();
        for membership in &memberships {
            if room_names.contains_key(&membership.room_id) {
                continue;
            }
            if let Some(room) = self.room_repo.find_by_id(membership.room_id).await? {
                room_names.insert(room.id, room.name);
            }
        }

        Ok(memberships
            .into_iter()
            .map(|m| MembershipDto {
                id: m.id,
                room_name: room_names.get(&m.room_id).cloned().unwrap_or_default(),
                username: names.get(&m.user_id).cloned().unwrap_or_default(),
                room_id: m.room_id,
                user_id: m.user_id,
                joined_at: m.joined_at,
            })
            .collect())
    }

    async fn membership_dto(&self, membership: Membership) -> Result<MembershipDto, AppError> {
        self.membership_dtos(vec![membership])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Membership vanished while rendering".into()))
    }
}

#[async_trait]
impl RoomService for RoomServiceImpl {
    async fn create_room(&self, caller_id: i64, name: &str) -> Result<RoomDto, AppError> {
        let name = validate_room_name(name)?;

        let room = Room::new(self.id_generator.generate(), name);
        let membership = Membership::new(self.id_generator.generate(), room.id, caller_id);
        let (room, _) = self.room_repo.create_with_member(&room, &membership).await?;

        tracing::info!(room_id = room.id, user_id = caller_id, "Room created");
        self.room_dto(room).await
    }

    async fn list_rooms(&self, caller_id: i64) -> Result<Vec<RoomDto>, AppError> {
        let rooms = self.room_repo.list_for_member(caller_id).await?;

        let mut dtos = Vec::with_capacity(rooms.len());
        for room in rooms {
            dtos.push(self.room_dto(room).await?);
        }
        Ok(dtos)
    }

    async fn get_room(&self, caller_id: i64, room_id: i64) -> Result<RoomDto, AppError> {
        let room = self.room_for_member(caller_id, room_id, Action::Read).await?;
        self.room_dto(room).await
    }

    async fn rename_room(&self, caller_id: i64, room_id: i64, name: &str) -> Result<RoomDto, AppError> {
        let name = validate_room_name(name)?;
        let room = Room {
            name,
            ..self.resolve_room(room_id).await?
        };

        let guard = membership_guard(caller_id, Action::Update, room.clone());
        let updated = self.room_repo.update_guarded(&room, caller_id, guard).await?;

        tracing::info!(room_id, user_id = caller_id, "Room renamed");
        self.room_dto(updated).await
    }

    async fn delete_room(&self, caller_id: i64, room_id: i64) -> Result<(), AppError> {
        let room = self.resolve_room(room_id).await?;

        let guard = membership_guard(caller_id, Action::Delete, room);
        self.room_repo.delete_guarded(room_id, caller_id, guard).await?;

        tracing::info!(room_id, user_id = caller_id, "Room deleted");
        Ok(())
    }

    async fn add_member(&self, caller_id: i64, room_id: i64, user_id: i64) -> Result<MembershipDto, AppError> {
        let room = self.resolve_room(room_id).await?;

        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "user: Invalid pk \"{}\" - object does not exist",
                user_id
            )));
        }

        let membership = Membership::new(self.id_generator.generate(), room.id, user_id);
        let guard = membership_guard(caller_id, Action::Create, membership.clone());
        let created = self
            .membership_repo
            .create_guarded(&membership, caller_id, guard)
            .await?;

        tracing::info!(room_id, user_id, added_by = caller_id, "Member added");
        self.membership_dto(created).await
    }

    async fn remove_member(&self, caller_id: i64, membership_id: i64) -> Result<(), AppError> {
        let membership = self.resolve_membership(membership_id).await?;

        let guard = membership_guard(caller_id, Action::Delete, membership.clone());
        self.membership_repo
            .delete_guarded(&membership, caller_id, guard)
            .await?;

        tracing::info!(
            room_id = membership.room_id,
            user_id = membership.user_id,
            removed_by = caller_id,
            "Member removed"
        );
        Ok(())
    }

    async fn list_memberships(&self, caller_id: i64, room_id: Option<i64>) -> Result<Vec<MembershipDto>, AppError> {
        let memberships = match room_id {
            Some(room_id) => {
                let room = self.room_for_member(caller_id, room_id, Action::Read).await?;
                self.membership_repo.list_by_room(room.id).await?
            }
            None => self.membership_repo.list_visible_to(caller_id).await?,
        };

        self.membership_dtos(memberships).await
    }

    async fn get_membership(&self, caller_id: i64, membership_id: i64) -> Result<MembershipDto, AppError> {
        let membership = self.resolve_membership(membership_id).await?;
        let own = self.membership_repo.find(membership.room_id, caller_id).await?;
        authorize(caller_id, Action::Read, &RoomScoped::new(&membership, own.as_ref()))?;

        self.membership_dto(membership).await
    }
}
