//! # Fleet Issues Adapter Layer
//!
//! Hexagonal Architecture adapters around the domain and use case crates.
//!
//! ## Structure
//!
//! - `controller/` - Inbound request handling (gateway headers + JSON bodies)
//! - `messaging/` - Inbound vehicle/user events, outbound issue events
//! - `repository/` - In-memory implementations of the domain ports

pub mod controller;
pub mod messaging;
pub mod repository;
