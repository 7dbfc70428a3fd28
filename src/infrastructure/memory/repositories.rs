//! Repository traits implemented over [`MemoryDatabase`].

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;

use super::store::MemoryDatabase;
use crate::domain::{
    DirectMessage, DirectMessageRepository, Membership, MembershipGuard, MembershipRepository,
    Room, RoomMessage, RoomMessageRepository, RoomRepository, User, UserRepository,
};
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct MemoryUserRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryUserRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.db.read(|t| t.users.get(&id).cloned()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.db.read(|t| t.users.values().find(|u| u.username == username).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.db.read(|t| t.users.values().find(|u| u.email == email).cloned()))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        Ok(self.db.read(|t| ids.iter().filter_map(|id| t.users.get(id).cloned()).collect()))
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.db.read(|t| t.users.values().cloned().collect());
        users.sort_by_key(|u| Reverse((u.created_at, u.id)));
        Ok(users)
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        self.db.transaction(|t| {
            if t.users.contains_key(&user.id) {
                return Err(AppError::Conflict("User already exists".to_string()));
            }
            t.put_user(user.clone())
        })
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        self.db.transaction(|t| {
            let current = t
                .users
                .get(&user.id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))?;
            t.put_user(User {
                username: user.username.clone(),
                email: user.email.clone(),
                ..current
            })
        })
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<User, AppError> {
        self.db.transaction(|t| {
            let user = t
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;
            Ok(t.upsert(User { is_active, ..user }))
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.db.transaction(|t| t.delete_user(id))
    }
}

#[derive(Clone)]
pub struct MemoryDirectMessageRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryDirectMessageRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DirectMessageRepository for MemoryDirectMessageRepository {
    async fn create(&self, message: &DirectMessage) -> Result<DirectMessage, AppError> {
        self.db.transaction(|t| t.insert_direct_message(message.clone()))
    }

    async fn find_for_participant(&self, id: i64, user_id: i64) -> Result<Option<DirectMessage>, AppError> {
        Ok(self.db.read(|t| {
            t.direct_messages
                .get(&id)
                .filter(|m| m.is_participant(user_id))
                .cloned()
        }))
    }

    async fn list_for_participant(&self, user_id: i64) -> Result<Vec<DirectMessage>, AppError> {
        let mut messages: Vec<DirectMessage> = self.db.read(|t| {
            t.direct_messages
                .values()
                .filter(|m| m.is_participant(user_id))
                .cloned()
                .collect()
        });
        messages.sort_by_key(|m| Reverse((m.created_at, m.id)));
        Ok(messages)
    }

    async fn list_conversation(&self, user_id: i64, other_user_id: i64) -> Result<Vec<DirectMessage>, AppError> {
        let mut messages: Vec<DirectMessage> = self.db.read(|t| {
            t.direct_messages
                .values()
                .filter(|m| {
                    (m.sender_id == user_id && m.receiver_id == other_user_id)
                        || (m.sender_id == other_user_id && m.receiver_id == user_id)
                })
                .cloned()
                .collect()
        });
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }

    async fn mark_read(&self, id: i64, receiver_id: i64) -> Result<Option<DirectMessage>, AppError> {
        self.db.transaction(|t| {
            let Some(message) = t
                .direct_messages
                .get(&id)
                .filter(|m| m.receiver_id == receiver_id)
                .cloned()
            else {
                return Ok(None);
            };
            Ok(Some(t.upsert(DirectMessage { is_read: true, ..message })))
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.db.transaction(|t| {
            t.remove::<DirectMessage>(id)
                .map(|_| ())
                .ok_or_else(|| AppError::NotFound(format!("Message with id {} not found", id)))
        })
    }
}

#[derive(Clone)]
pub struct MemoryRoomRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryRoomRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomRepository for MemoryRoomRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError> {
        Ok(self.db.read(|t| t.rooms.get(&id).cloned()))
    }

    async fn list_for_member(&self, user_id: i64) -> Result<Vec<Room>, AppError> {
        let mut rooms: Vec<Room> = self.db.read(|t| {
            t.rooms
                .values()
                .filter(|r| t.is_member(r.id, user_id))
                .cloned()
                .collect()
        });
        rooms.sort_by_key(|r| Reverse((r.created_at, r.id)));
        Ok(rooms)
    }

    async fn create_with_member(&self, room: &Room, membership: &Membership) -> Result<(Room, Membership), AppError> {
        self.db.transaction(|t| {
            if t.rooms.contains_key(&room.id) {
                return Err(AppError::Conflict("Room already exists".to_string()));
            }
            let room = t.put_room(room.clone());
            let membership = t.insert_membership(membership.clone())?;
            Ok((room, membership))
        })
    }

    async fn update_guarded(&self, room: &Room, actor_id: i64, guard: MembershipGuard) -> Result<Room, AppError> {
        self.db.transaction(|t| {
            t.require_room(room.id)?;
            guard(t.membership_of(room.id, actor_id))?;
            let current = t
                .rooms
                .get(&room.id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Room with id {} not found", room.id)))?;
            Ok(t.put_room(Room {
                name: room.name.clone(),
                ..current
            }))
        })
    }

    async fn delete_guarded(&self, id: i64, actor_id: i64, guard: MembershipGuard) -> Result<(), AppError> {
        self.db.transaction(|t| {
            t.require_room(id)?;
            guard(t.membership_of(id, actor_id))?;
            t.delete_room(id)
        })
    }
}

#[derive(Clone)]
pub struct MemoryMembershipRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryMembershipRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

fn newest_joined_first(memberships: &mut [Membership]) {
    memberships.sort_by_key(|m| Reverse((m.joined_at, m.id)));
}

#[async_trait]
impl MembershipRepository for MemoryMembershipRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, AppError> {
        Ok(self.db.read(|t| t.memberships.get(&id).cloned()))
    }

    async fn find(&self, room_id: i64, user_id: i64) -> Result<Option<Membership>, AppError> {
        Ok(self.db.read(|t| t.membership_of(room_id, user_id).cloned()))
    }

    async fn list_visible_to(&self, user_id: i64) -> Result<Vec<Membership>, AppError> {
        let mut memberships: Vec<Membership> = self.db.read(|t| {
            t.memberships
                .values()
                .filter(|m| t.is_member(m.room_id, user_id))
                .cloned()
                .collect()
        });
        newest_joined_first(&mut memberships);
        Ok(memberships)
    }

    async fn list_by_room(&self, room_id: i64) -> Result<Vec<Membership>, AppError> {
        let mut memberships: Vec<Membership> = self.db.read(|t| {
            t.memberships
                .values()
                .filter(|m| m.room_id == room_id)
                .cloned()
                .collect()
        });
        newest_joined_first(&mut memberships);
        Ok(memberships)
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError> {
        Ok(self.db.read(|t| t.memberships.values().filter(|m| m.room_id == room_id).count() as i64))
    }

    async fn create_guarded(
        &self,
        membership: &Membership,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<Membership, AppError> {
        self.db.transaction(|t| {
            t.require_room(membership.room_id)?;
            guard(t.membership_of(membership.room_id, actor_id))?;
            t.insert_membership(membership.clone())
        })
    }

    async fn delete_guarded(
        &self,
        membership: &Membership,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<(), AppError> {
        self.db.transaction(|t| {
            t.require_room(membership.room_id)?;
            guard(t.membership_of(membership.room_id, actor_id))?;
            t.remove::<Membership>(membership.id)
                .map(|_| ())
                .ok_or_else(|| AppError::NotFound(format!("Membership with id {} not found", membership.id)))
        })
    }
}

#[derive(Clone)]
pub struct MemoryRoomMessageRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryRoomMessageRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomMessageRepository for MemoryRoomMessageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<RoomMessage>, AppError> {
        Ok(self.db.read(|t| t.room_messages.get(&id).cloned()))
    }

    async fn list_by_room(&self, room_id: i64) -> Result<Vec<RoomMessage>, AppError> {
        let mut messages: Vec<RoomMessage> = self.db.read(|t| {
            t.room_messages
                .values()
                .filter(|m| m.room_id == room_id)
                .cloned()
                .collect()
        });
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }

    async fn list_for_member(&self, user_id: i64) -> Result<Vec<RoomMessage>, AppError> {
        let mut messages: Vec<RoomMessage> = self.db.read(|t| {
            t.room_messages
                .values()
                .filter(|m| t.is_member(m.room_id, user_id))
                .cloned()
                .collect()
        });
        messages.sort_by_key(|m| Reverse((m.created_at, m.id)));
        Ok(messages)
    }

    async fn create_guarded(&self, message: &RoomMessage, guard: MembershipGuard) -> Result<RoomMessage, AppError> {
        self.db.transaction(|t| {
            t.require_room(message.room_id)?;
            guard(t.membership_of(message.room_id, message.sender_id))?;
            t.insert_room_message(message.clone())
        })
    }

    async fn delete_guarded(
        &self,
        message: &RoomMessage,
        actor_id: i64,
        guard: MembershipGuard,
    ) -> Result<(), AppError> {
        self.db.transaction(|t| {
            t.require_room(message.room_id)?;
            guard(t.membership_of(message.room_id, actor_id))?;
            t.remove::<RoomMessage>(message.id)
                .map(|_| ())
                .ok_or_else(|| AppError::NotFound(format!("Message with id {} not found", message.id)))
        })
    }
}
