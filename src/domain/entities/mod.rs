//! # Domain Entities
//!
//! Core domain entities representing the main business objects in the chat backend.
//! All entities map directly to their corresponding database tables.
//!
//! - **User**: user account
//! - **DirectMessage**: a private message between two users
//! - **Room**: a group chat room
//! - **Membership**: a user's membership in a room, the sole grant of room access
//! - **RoomMessage**: a message posted to a room
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod direct_message;
mod membership;
mod room;
mod room_message;
mod user;

pub use direct_message::{DirectMessage, DirectMessageRepository};
pub use membership::{Membership, MembershipGuard, MembershipRepository};
pub use room::{Room, RoomRepository, MAX_ROOM_NAME_LENGTH};
pub use room_message::{RoomMessage, RoomMessageRepository};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use user::MockUserRepository;
