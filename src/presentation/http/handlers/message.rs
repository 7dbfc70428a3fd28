//! Direct Message Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{ConversationQuery, SendDirectMessageRequest};
use crate::application::dto::response::DirectMessageResponse;
use crate::application::services::{DirectMessageService, DirectMessageServiceImpl};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;
use crate::startup::AppState;

fn message_service(state: &AppState) -> DirectMessageServiceImpl {
    DirectMessageServiceImpl::new(
        state.repos.direct_messages.clone(),
        state.repos.users.clone(),
        state.snowflake.clone(),
    )
}

/// List the caller's messages, newest first
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<DirectMessageResponse>>, AppError> {
    let messages = message_service(&state).list(auth.user_id).await?;

    Ok(Json(messages.into_iter().map(DirectMessageResponse::from).collect()))
}

/// Send a direct message
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendDirectMessageRequest>,
) -> Result<(StatusCode, Json<DirectMessageResponse>), AppError> {
    let message = message_service(&state)
        .send(auth.user_id, body.receiver, &body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(DirectMessageResponse::from(message))))
}

/// Conversation with `?user_id=`, oldest first
pub async fn conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<DirectMessageResponse>>, AppError> {
    let messages = message_service(&state)
        .conversation(auth.user_id, query.user_id()?)
        .await?;

    Ok(Json(messages.into_iter().map(DirectMessageResponse::from).collect()))
}

/// Get a single message
pub async fn get_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<DirectMessageResponse>, AppError> {
    let message_id = parse_id("message ID", &message_id)?;
    let message = message_service(&state).get(auth.user_id, message_id).await?;

    Ok(Json(DirectMessageResponse::from(message)))
}

/// Mark a received message as read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<DirectMessageResponse>, AppError> {
    let message_id = parse_id("message ID", &message_id)?;
    let message = message_service(&state).mark_read(auth.user_id, message_id).await?;

    Ok(Json(DirectMessageResponse::from(message)))
}

/// Delete a sent message
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let message_id = parse_id("message ID", &message_id)?;
    message_service(&state).delete(auth.user_id, message_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
