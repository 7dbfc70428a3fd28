//! HTTP API
//!
//! Handlers and route table for the REST interface.

pub mod handlers;
pub mod routes;
