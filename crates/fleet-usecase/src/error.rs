//! Issue use case errors

use fleet_domain::{CarrierId, IssueId, RepositoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Manager unresolved for carrier {carrier_id}; the carrier must be assigned to a vehicle first")]
    ManagerUnresolved { carrier_id: CarrierId },

    #[error("Vehicle unresolved for carrier {carrier_id}; VEHICLE issues need an assigned vehicle")]
    VehicleUnresolved { carrier_id: CarrierId },

    #[error("Invalid issue: {0}")]
    Validation(String),

    #[error("Issue {id} not found")]
    NotFound { id: IssueId },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IssueError {
    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        IssueError::Forbidden {
            reason: reason.into(),
        }
    }

    /// HTTP status a REST front end answers with
    pub fn status(&self) -> u16 {
        match self {
            IssueError::Unauthenticated => 401,
            IssueError::Forbidden { .. } => 403,
            IssueError::ManagerUnresolved { .. }
            | IssueError::VehicleUnresolved { .. }
            | IssueError::Validation(_) => 400,
            IssueError::NotFound { .. } => 404,
            IssueError::Repository(_) => 500,
        }
    }
}
