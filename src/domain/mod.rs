//! # Domain Layer
//!
//! The domain layer contains the core business rules of the chat backend.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, DirectMessage, Room, Membership, RoomMessage)
//!   and the repository traits the infrastructure layer implements
//! - **services**: Access policies shared by every application service
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Policies are pure functions of the caller and a resource snapshot

pub mod entities;
pub mod services;

// Re-export commonly used types
pub use entities::*;
