//! In-memory storage backend.
//!
//! Mirrors the PostgreSQL schema constraints (unique pairs, foreign keys,
//! cascades) so services behave the same on either backend.

mod repositories;
mod store;

pub use repositories::{
    MemoryDirectMessageRepository, MemoryMembershipRepository, MemoryRoomMessageRepository,
    MemoryRoomRepository, MemoryUserRepository,
};
pub use store::{MemoryDatabase, Tables, Transaction};
