//! User Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::UpdateUserRequest;
use crate::application::dto::response::UserResponse;
use crate::application::services::{UpdateProfileDto, UserService, UserServiceImpl};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn user_service(state: &AppState) -> UserServiceImpl {
    UserServiceImpl::new(state.repos.users.clone())
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = user_service(&state).list_users().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_user(auth.user_id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Get user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = parse_id("user ID", &user_id)?;
    let user = user_service(&state).get_user(user_id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a profile; only the account itself may
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = parse_id("user ID", &user_id)?;
    body.validate().map_err(validation_error)?;

    let update = UpdateProfileDto {
        username: body.username,
        email: body.email,
    };
    let user = user_service(&state)
        .update_profile(auth.user_id, user_id, update)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Deactivate an account; only the account itself may
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = parse_id("user ID", &user_id)?;
    let user = user_service(&state).deactivate(auth.user_id, user_id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete an account; only the account itself may
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = parse_id("user ID", &user_id)?;
    user_service(&state).delete_user(auth.user_id, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
