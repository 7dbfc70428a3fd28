//! User Service
//!
//! Handles account lookup and self-profile management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::services::{authorize, Action};
use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, user_id: i64) -> Result<UserDto, AppError>;

    /// List every account
    async fn list_users(&self) -> Result<Vec<UserDto>, AppError>;

    /// Update username and/or email of `target_id`; only the account itself may.
    async fn update_profile(&self, caller_id: i64, target_id: i64, update: UpdateProfileDto) -> Result<UserDto, AppError>;

    /// Deactivate `target_id`; only the account itself may.
    async fn deactivate(&self, caller_id: i64, target_id: i64) -> Result<UserDto, AppError>;

    /// Delete `target_id`; only the account itself may.
    async fn delete_user(&self, caller_id: i64, target_id: i64) -> Result<(), AppError>;
}

/// User data transfer object
#[derive(Debug, Clone)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Update profile request
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// UserService implementation
pub struct UserServiceImpl {
    user_repo: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    async fn resolve(&self, user_id: i64) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_user(&self, user_id: i64) -> Result<UserDto, AppError> {
        self.resolve(user_id).await.map(UserDto::from)
    }

    async fn list_users(&self) -> Result<Vec<UserDto>, AppError> {
        let users = self.user_repo.list().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    async fn update_profile(&self, caller_id: i64, target_id: i64, update: UpdateProfileDto) -> Result<UserDto, AppError> {
        let mut user = self.resolve(target_id).await?;
        authorize(caller_id, Action::Update, &user)?;

        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }

        let updated = self.user_repo.update(&user).await?;
        tracing::info!(user_id = updated.id, "Profile updated");

        Ok(UserDto::from(updated))
    }

    async fn deactivate(&self, caller_id: i64, target_id: i64) -> Result<UserDto, AppError> {
        let user = self.resolve(target_id).await?;
        authorize(caller_id, Action::Update, &user)?;

        let updated = self.user_repo.set_active(user.id, false).await?;
        tracing::info!(user_id = updated.id, "Account deactivated");

        Ok(UserDto::from(updated))
    }

    async fn delete_user(&self, caller_id: i64, target_id: i64) -> Result<(), AppError> {
        let user = self.resolve(target_id).await?;
        authorize(caller_id, Action::Delete, &user)?;

        self.user_repo.delete(user.id).await?;
        tracing::info!(user_id = user.id, "Account deleted");

        Ok(())
    }
}
