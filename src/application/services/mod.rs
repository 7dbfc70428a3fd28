//! Application Services
//!
//! Business logic services that coordinate domain operations. Every service
//! takes the authenticated caller's id and routes each decision through
//! [`authorize`](crate::domain::services::authorize).
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT issuing and validation
//! - **UserService**: Account lookup and self-profile management
//! - **DirectMessageService**: Direct messages between two users
//! - **RoomService**: Rooms and their member rosters
//! - **RoomMessageService**: Messages posted to rooms

pub mod auth_service;
pub mod direct_message_service;
pub mod room_message_service;
pub mod room_service;
pub mod user_service;

use std::collections::HashMap;

use crate::domain::services::{authorize, AccessControlled, Action, InRoom, RoomScoped};
use crate::domain::{Membership, MembershipGuard, UserRepository};
use crate::shared::error::AppError;

// Re-export auth service types
pub use auth_service::{AccessToken, AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims, TokenType};

// Re-export user service types
pub use user_service::{UpdateProfileDto, UserDto, UserService, UserServiceImpl};

// Re-export direct message service types
pub use direct_message_service::{DirectMessageDto, DirectMessageService, DirectMessageServiceImpl};

// Re-export room service types
pub use room_service::{MembershipDto, RoomDto, RoomService, RoomServiceImpl};

// Re-export room message service types
pub use room_message_service::{RoomMessageDto, RoomMessageService, RoomMessageServiceImpl};

/// Resolve usernames for a set of user ids in one query.
pub(crate) async fn usernames(
    users: &dyn UserRepository,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, String>, AppError> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    Ok(users
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect())
}

/// Build a guard that authorizes `action` on `resource` against the acting
/// user's membership as the store reads it inside the write transaction.
pub(crate) fn membership_guard<T>(caller_id: i64, action: Action, resource: T) -> MembershipGuard
where
    T: InRoom + Send + 'static,
    for<'a> RoomScoped<'a, T>: AccessControlled,
{
    Box::new(move |membership: Option<&Membership>| {
        authorize(caller_id, action, &RoomScoped::new(&resource, membership))
    })
}
