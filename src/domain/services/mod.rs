//! # Domain Services
//!
//! Domain services encapsulate business rules that don't naturally belong to
//! a single entity.
//!
//! ## Services
//!
//! - **access_policy**: ownership and membership predicates, and the
//!   `authorize` entry point every application service goes through

mod access_policy;

pub use access_policy::*;
