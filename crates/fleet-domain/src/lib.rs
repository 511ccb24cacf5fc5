//! # Fleet Domain Layer
//!
//! Pure business logic for the issues service: the cross-service
//! relationship index and the Issue aggregate.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Identifiers, inbound events, Issue            ││
//! │  │  repository/- Port traits (RelationshipStore, Issues)       ││
//! │  │  service/   - RelationshipIndex (ingestion + resolution)    ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Golden Rule
//!
//! **This crate has ZERO external dependencies.**
//!
//! The index is fed by whatever transport delivers vehicle and user events,
//! and read by whatever front end accepts issue reports. Neither choice
//! leaks in here.

pub mod model;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use model::{
    event::{DomainEvent, UserCreated, UserUpdated, VehicleCreated, VehicleStatus, VehicleUpdated},
    ids::{CarrierId, IssueId, ManagerId, ShipmentId, UserId, VehicleId},
    issue::{Issue, IssueCreated, IssueDraft, IssueEvent, IssueType, IssueUpdated},
};

pub use repository::{
    issue_repository::{IssueRepository, RepositoryError},
    relationship_store::{Assignment, RelationshipStore},
};

pub use service::relationship_index::{ApplyOutcome, IndexStats, RelationshipIndex};
