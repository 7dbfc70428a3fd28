//! Room and Room Membership Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{AddMemberRequest, RoomQuery, RoomRequest};
use crate::application::dto::response::{MembershipResponse, RoomResponse};
use crate::application::services::{RoomService, RoomServiceImpl};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;
use crate::startup::AppState;

fn room_service(state: &AppState) -> RoomServiceImpl {
    RoomServiceImpl::new(
        state.repos.rooms.clone(),
        state.repos.memberships.clone(),
        state.repos.users.clone(),
        state.snowflake.clone(),
    )
}

/// List rooms the caller belongs to
pub async fn list_rooms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rooms = room_service(&state).list_rooms(auth.user_id).await?;

    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// Create a room; the caller becomes its first member
pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<RoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    let room = room_service(&state).create_room(auth.user_id, &body.name).await?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from(room))))
}

/// Get a room
pub async fn get_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room_id = parse_id("room ID", &room_id)?;
    let room = room_service(&state).get_room(auth.user_id, room_id).await?;

    Ok(Json(RoomResponse::from(room)))
}

/// Rename a room
pub async fn update_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<String>,
    Json(body): Json<RoomRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    let room_id = parse_id("room ID", &room_id)?;
    let room = room_service(&state)
        .rename_room(auth.user_id, room_id, &body.name)
        .await?;

    Ok(Json(RoomResponse::from(room)))
}

/// Delete a room
pub async fn delete_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let room_id = parse_id("room ID", &room_id)?;
    room_service(&state).delete_room(auth.user_id, room_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List memberships visible to the caller, optionally for one room
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Vec<MembershipResponse>>, AppError> {
    let memberships = room_service(&state)
        .list_memberships(auth.user_id, query.room_id()?)
        .await?;

    Ok(Json(memberships.into_iter().map(MembershipResponse::from).collect()))
}

/// Add a user to a room
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MembershipResponse>), AppError> {
    let membership = room_service(&state)
        .add_member(auth.user_id, body.room, body.user)
        .await?;

    Ok((StatusCode::CREATED, Json(MembershipResponse::from(membership))))
}

/// Get a membership
pub async fn get_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(membership_id): Path<String>,
) -> Result<Json<MembershipResponse>, AppError> {
    let membership_id = parse_id("membership ID", &membership_id)?;
    let membership = room_service(&state)
        .get_membership(auth.user_id, membership_id)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

/// Remove a membership (leave, or remove another member)
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(membership_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let membership_id = parse_id("membership ID", &membership_id)?;
    room_service(&state)
        .remove_member(auth.user_id, membership_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
