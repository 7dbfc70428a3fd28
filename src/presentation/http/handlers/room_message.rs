//! Room Message Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{RoomQuery, SendRoomMessageRequest};
use crate::application::dto::response::RoomMessageResponse;
use crate::application::services::{RoomMessageService, RoomMessageServiceImpl};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;
use crate::startup::AppState;

fn room_message_service(state: &AppState) -> RoomMessageServiceImpl {
    RoomMessageServiceImpl::new(
        state.repos.room_messages.clone(),
        state.repos.rooms.clone(),
        state.repos.memberships.clone(),
        state.repos.users.clone(),
        state.snowflake.clone(),
    )
}

/// Messages of every room the caller belongs to, newest first
pub async fn list_room_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<RoomMessageResponse>>, AppError> {
    let messages = room_message_service(&state).list_visible(auth.user_id).await?;

    Ok(Json(messages.into_iter().map(RoomMessageResponse::from).collect()))
}

/// Messages of `?room_id=`, oldest first
pub async fn list_by_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Vec<RoomMessageResponse>>, AppError> {
    let messages = room_message_service(&state)
        .list_by_room(auth.user_id, query.room_id()?)
        .await?;

    Ok(Json(messages.into_iter().map(RoomMessageResponse::from).collect()))
}

/// Post a message to a room
pub async fn send_room_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendRoomMessageRequest>,
) -> Result<(StatusCode, Json<RoomMessageResponse>), AppError> {
    let message = room_message_service(&state)
        .send(auth.user_id, body.room, &body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(RoomMessageResponse::from(message))))
}

/// Get a single room message
pub async fn get_room_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<RoomMessageResponse>, AppError> {
    let message_id = parse_id("message ID", &message_id)?;
    let message = room_message_service(&state).get(auth.user_id, message_id).await?;

    Ok(Json(RoomMessageResponse::from(message)))
}

/// Delete a room message
pub async fn delete_room_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let message_id = parse_id("message ID", &message_id)?;
    room_message_service(&state).delete(auth.user_id, message_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
