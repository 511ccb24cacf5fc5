//! Outbound event port

use fleet_domain::IssueEvent;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to publish event for issue {issue_id}: {reason}")]
pub struct PublishError {
    pub issue_id: i64,
    pub reason: String,
}

/// Publishes issue events to other services
///
/// This is a PORT; the transport lives in the adapter layer.
pub trait IssueEventPublisher {
    fn publish(&self, event: &IssueEvent) -> Result<(), PublishError>;
}
