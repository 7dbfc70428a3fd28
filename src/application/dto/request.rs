//! Request DTOs
//!
//! Data structures for API request bodies and query strings.
//!
//! Snowflake ids travel as JSON strings but bare numbers are accepted too.

use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn snowflake<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id \"{}\"", text))),
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub username: String,

    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 150, message = "Username must be 2-150 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Password fields didn't match"))]
    pub password_confirm: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

/// Update user request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 150, message = "Username must be 2-150 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Send direct message request
#[derive(Debug, Deserialize)]
pub struct SendDirectMessageRequest {
    #[serde(deserialize_with = "snowflake")]
    pub receiver: i64,
    pub content: String,
}

/// Create or rename room request
#[derive(Debug, Deserialize)]
pub struct RoomRequest {
    pub name: String,
}

/// Add room member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    #[serde(deserialize_with = "snowflake")]
    pub room: i64,
    #[serde(deserialize_with = "snowflake")]
    pub user: i64,
}

/// Send room message request
#[derive(Debug, Deserialize)]
pub struct SendRoomMessageRequest {
    #[serde(deserialize_with = "snowflake")]
    pub room: i64,
    pub content: String,
}

/// `?user_id=` for the conversation view
#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub user_id: Option<String>,
}

impl ConversationQuery {
    pub fn user_id(&self) -> Result<Option<i64>, AppError> {
        parse_optional("user_id", self.user_id.as_deref())
    }
}

/// `?room_id=` filter
#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    pub room_id: Option<String>,
}

impl RoomQuery {
    pub fn room_id(&self) -> Result<Option<i64>, AppError> {
        parse_optional("room_id", self.room_id.as_deref())
    }
}

/// An empty parameter counts as absent.
fn parse_optional(field: &str, value: Option<&str>) -> Result<Option<i64>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_id(field, raw).map(Some),
    }
}
