//! Response DTOs
//!
//! Data structures for API response bodies. Ids are rendered as strings so
//! 64-bit Snowflakes survive JavaScript clients.

use serde::Serialize;

use crate::application::services::{
    AccessToken, AuthTokens, DirectMessageDto, MembershipDto, RoomDto, RoomMessageDto, UserDto,
};
use crate::domain::User;

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AccessToken> for AccessTokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token: token.access_token,
            expires_in: token.expires_in,
            token_type: token.token_type,
        }
    }
}

/// Register and login response (user plus tokens)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

impl AuthResponse {
    pub fn new(user: User, tokens: AuthTokens) -> Self {
        Self {
            user: UserResponse::from(UserDto::from(user)),
            tokens: TokenResponse::from(tokens),
        }
    }
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<UserDto> for UserResponse {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id.to_string(),
            username: dto.username,
            email: dto.email,
            is_active: dto.is_active,
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}

/// Direct message response
#[derive(Debug, Serialize)]
pub struct DirectMessageResponse {
    pub id: String,
    pub sender: String,
    pub sender_username: String,
    pub receiver: String,
    pub receiver_username: String,
    pub content: String,
    pub timestamp: String,
    pub is_read: bool,
}

impl From<DirectMessageDto> for DirectMessageResponse {
    fn from(dto: DirectMessageDto) -> Self {
        Self {
            id: dto.id.to_string(),
            sender: dto.sender_id.to_string(),
            sender_username: dto.sender_username,
            receiver: dto.receiver_id.to_string(),
            receiver_username: dto.receiver_username,
            content: dto.content,
            timestamp: dto.created_at.to_rfc3339(),
            is_read: dto.is_read,
        }
    }
}

/// Room response
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub member_count: i64,
}

impl From<RoomDto> for RoomResponse {
    fn from(dto: RoomDto) -> Self {
        Self {
            id: dto.id.to_string(),
            name: dto.name,
            created_at: dto.created_at.to_rfc3339(),
            member_count: dto.member_count,
        }
    }
}

/// Room membership response
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: String,
    pub room: String,
    pub room_name: String,
    pub user: String,
    pub username: String,
    pub joined_at: String,
}

impl From<MembershipDto> for MembershipResponse {
    fn from(dto: MembershipDto) -> Self {
        Self {
            id: dto.id.to_string(),
            room: dto.room_id.to_string(),
            room_name: dto.room_name,
            user: dto.user_id.to_string(),
            username: dto.username,
            joined_at: dto.joined_at.to_rfc3339(),
        }
    }
}

/// Room message response
#[derive(Debug, Serialize)]
pub struct RoomMessageResponse {
    pub id: String,
    pub room: String,
    pub room_name: String,
    pub sender: String,
    pub sender_username: String,
    pub content: String,
    pub timestamp: String,
}

impl From<RoomMessageDto> for RoomMessageResponse {
    fn from(dto: RoomMessageDto) -> Self {
        Self {
            id: dto.id.to_string(),
            room: dto.room_id.to_string(),
            room_name: dto.room_name,
            sender: dto.sender_id.to_string(),
            sender_username: dto.sender_username,
            content: dto.content,
            timestamp: dto.created_at.to_rfc3339(),
        }
    }
}
