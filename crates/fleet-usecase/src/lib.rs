//! # Fleet Use Case Layer
//!
//! Application-specific business rules.
//! This layer orchestrates the flow of data between the domain and adapters:
//! a caller files an issue, the relationship index supplies the manager and
//! vehicle, the repository stores it and the publisher announces it.

pub mod caller;
pub mod error;
pub mod issue_service;
pub mod publisher;

pub use fleet_domain;

pub use caller::CallerIdentity;
pub use error::IssueError;
pub use issue_service::{CreateIssueRequest, IssueService, UpdateIssueRequest};
pub use publisher::{IssueEventPublisher, PublishError};
