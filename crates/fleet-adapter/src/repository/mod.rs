//! Persistence Adapters - Repository implementations
//!
//! These implement the store and repository traits from fleet-domain.

pub mod in_memory;

pub use in_memory::{InMemoryIssueRepository, InMemoryRelationshipStore};
