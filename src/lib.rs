//! # Chat Backend Library
//!
//! REST backend for user accounts, direct messages and chat rooms:
//! - RESTful HTTP API endpoints with JWT authentication
//! - Ownership and room-membership access control
//! - PostgreSQL or in-memory storage behind repository traits
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, repository traits and the access policy
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: PostgreSQL and in-memory storage engines
//! - **Presentation Layer**: HTTP handlers, routes and middleware
//!
//! ## Module Structure
//!
//! ```text
//! chat_backend/
//! +-- config/         Configuration management
//! +-- domain/         Entities, repository traits, access policy
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ PostgreSQL and in-memory repositories
//! +-- presentation/   HTTP routes, handlers and middleware
//! +-- shared/         Common utilities (errors, snowflake IDs, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - Storage engines
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
