//! Repository Traits - The "Ports" of Hexagonal Architecture
//!
//! These traits define what the domain needs from storage, not how it is
//! done. That's the adapter's job.
//!
//! ```text
//! Domain Layer              │  Adapter Layer
//! ──────────────────────────┼────────────────────────────
//! trait RelationshipStore   │  InMemoryRelationshipStore
//! trait IssueRepository     │  InMemoryIssueRepository
//! ```

pub mod issue_repository;
pub mod relationship_store;
