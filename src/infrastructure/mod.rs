//! Infrastructure Layer
//!
//! Contains implementations of the domain repository traits:
//! - PostgreSQL repositories for production
//! - An in-memory engine for tests and local development
//!
//! [`Repositories`] bundles one implementation of each trait so the rest of
//! the application never depends on the storage backend.

pub mod database;
pub mod memory;
pub mod repositories;

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::{
    DirectMessageRepository, MembershipRepository, RoomMessageRepository, RoomRepository,
    UserRepository,
};

use memory::{
    MemoryDatabase, MemoryDirectMessageRepository, MemoryMembershipRepository,
    MemoryRoomMessageRepository, MemoryRoomRepository, MemoryUserRepository,
};
use repositories::{
    PgDirectMessageRepository, PgMembershipRepository, PgRoomMessageRepository, PgRoomRepository,
    PgUserRepository,
};

/// One repository per entity, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub direct_messages: Arc<dyn DirectMessageRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub room_messages: Arc<dyn RoomMessageRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            direct_messages: Arc::new(PgDirectMessageRepository::new(pool.clone())),
            rooms: Arc::new(PgRoomRepository::new(pool.clone())),
            memberships: Arc::new(PgMembershipRepository::new(pool.clone())),
            room_messages: Arc::new(PgRoomMessageRepository::new(pool)),
        }
    }

    /// Repositories backed by a fresh in-memory database.
    pub fn in_memory() -> Self {
        Self::memory(Arc::new(MemoryDatabase::new()))
    }

    /// Repositories sharing an existing in-memory database.
    pub fn memory(db: Arc<MemoryDatabase>) -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new(db.clone())),
            direct_messages: Arc::new(MemoryDirectMessageRepository::new(db.clone())),
            rooms: Arc::new(MemoryRoomRepository::new(db.clone())),
            memberships: Arc::new(MemoryMembershipRepository::new(db.clone())),
            room_messages: Arc::new(MemoryRoomMessageRepository::new(db)),
        }
    }
}
