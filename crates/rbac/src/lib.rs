//! # Fleet RBAC
//!
//! Gateway-side authentication and role authorization.
//!
//! ## Components
//!
//! - `TokenVerifier` - Bearer token verification port
//! - `RouteGuard` - Role requirements per request path
//! - `Gateway` - Admission: verify, authorize, forward identity headers

pub mod error;
pub mod gateway;
pub mod route_guard;
pub mod token;

pub use error::AuthError;
pub use gateway::{ForwardedIdentity, Gateway};
pub use route_guard::{RouteGuard, RouteRule};
pub use token::{bearer_token, Claims, StaticTokenVerifier, TokenVerifier};
