//! Issue Repository - Abstract persistence for Issues

use crate::model::ids::{CarrierId, IssueId, ManagerId};
use crate::model::issue::{Issue, IssueDraft, IssueType};

/// Errors that can occur during repository operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Issue not found
    NotFound { id: IssueId },
    /// Failed to persist
    PersistenceError { message: String },
}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RepositoryError::NotFound { id } => {
                write!(f, "Issue not found: {}", id)
            }
            RepositoryError::PersistenceError { message } => {
                write!(f, "Persistence error: {}", message)
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Issue Repository Trait
///
/// This is a PORT in hexagonal architecture.
/// Ids are assigned by the repository on insert.
pub trait IssueRepository {
    /// Persist a new issue and return it with its id
    fn insert(&mut self, draft: IssueDraft) -> Result<Issue, RepositoryError>;

    /// Overwrite an existing issue
    fn save(&mut self, issue: &Issue) -> Result<(), RepositoryError>;

    fn find_by_id(&self, id: IssueId) -> Result<Option<Issue>, RepositoryError>;

    fn find_by_carrier(&self, carrier_id: CarrierId) -> Result<Vec<Issue>, RepositoryError>;

    fn find_by_manager(&self, manager_id: ManagerId) -> Result<Vec<Issue>, RepositoryError>;

    fn find_by_type(&self, issue_type: IssueType) -> Result<Vec<Issue>, RepositoryError>;

    /// Delete an issue. Returns false if it did not exist.
    fn delete(&mut self, id: IssueId) -> Result<bool, RepositoryError>;

    /// Check if an issue exists
    fn exists(&self, id: IssueId) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id)?.is_some())
    }

    fn count(&self) -> Result<usize, RepositoryError>;
}
