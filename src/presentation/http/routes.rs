//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use super::handlers;
use crate::presentation::middleware::auth_middleware;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}

/// API routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .nest("/auth", auth_routes())
        // Protected routes (require authentication)
        .nest("/users", user_routes(state.clone()))
        .nest("/messages", message_routes(state.clone()))
        .nest("/rooms", room_routes(state.clone()))
        .nest("/room-members", membership_routes(state.clone()))
        .nest("/room-messages", room_message_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/token/refresh", post(handlers::auth::refresh_token))
}

/// User routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::user::list_users))
        .route("/me", get(handlers::user::get_current_user))
        .route(
            "/{user_id}",
            get(handlers::user::get_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route("/{user_id}/deactivate", post(handlers::user::deactivate_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Direct message routes (protected)
fn message_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::message::list_messages).post(handlers::message::send_message),
        )
        .route("/conversation", get(handlers::message::conversation))
        .route(
            "/{message_id}",
            get(handlers::message::get_message).delete(handlers::message::delete_message),
        )
        .route("/{message_id}/mark_read", patch(handlers::message::mark_read))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Room routes (protected)
fn room_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::room::list_rooms).post(handlers::room::create_room),
        )
        .route(
            "/{room_id}",
            get(handlers::room::get_room)
                .patch(handlers::room::update_room)
                .delete(handlers::room::delete_room),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Room membership routes (protected)
fn membership_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::room::list_members).post(handlers::room::add_member),
        )
        .route(
            "/{membership_id}",
            get(handlers::room::get_member).delete(handlers::room::remove_member),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Room message routes (protected)
fn room_message_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::room_message::list_room_messages)
                .post(handlers::room_message::send_room_message),
        )
        .route("/by_room", get(handlers::room_message::list_by_room))
        .route(
            "/{message_id}",
            get(handlers::room_message::get_room_message)
                .delete(handlers::room_message::delete_room_message),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
