//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - User account management
//! - **PgDirectMessageRepository** - Direct messages, always scoped to a participant
//! - **PgRoomRepository** - Rooms, created together with their first membership
//! - **PgMembershipRepository** - Room memberships with guarded writes
//! - **PgRoomMessageRepository** - Room messages with guarded writes
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgUserRepository, PgRoomRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let room_repo = PgRoomRepository::new(pool.clone());
//! }
//! ```

pub mod direct_message_repository;
pub mod membership_repository;
pub mod room_message_repository;
pub mod room_repository;
pub mod user_repository;

pub use direct_message_repository::PgDirectMessageRepository;
pub use membership_repository::PgMembershipRepository;
pub use room_message_repository::PgRoomMessageRepository;
pub use room_repository::PgRoomRepository;
pub use user_repository::PgUserRepository;
