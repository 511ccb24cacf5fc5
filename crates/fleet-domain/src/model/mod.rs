//! Domain Models - The vocabulary of the issues service
//!
//! Identifiers are plain numeric keys owned by other services. The index
//! never holds anything richer than these foreign keys.

pub mod event;
pub mod ids;
pub mod issue;
