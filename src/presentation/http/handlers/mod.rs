//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod health;
pub mod message;
pub mod room;
pub mod room_message;
pub mod user;
