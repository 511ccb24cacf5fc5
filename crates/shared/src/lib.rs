//! # Fleet Shared
//!
//! Common types used across the fleet crates: errors, configuration and
//! gateway role names.

pub mod config;
pub mod error;
pub mod role;

// Re-exports
pub use config::*;
pub use error::*;
pub use role::{normalize_role, RoleSet, USER_ID_HEADER, USER_ROLES_HEADER};
