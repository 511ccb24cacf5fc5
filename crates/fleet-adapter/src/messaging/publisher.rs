//! Issue event publishers
//!
//! The broker binding is out of process; these adapters render each event
//! as its wire message and hand it to a log or an in-memory outbox.

use std::sync::{Arc, Mutex};

use fleet_domain::IssueEvent;
use fleet_usecase::{IssueEventPublisher, PublishError};
use tracing::info;

use super::dto::IssueMessage;

fn render(event: &IssueEvent) -> Result<String, PublishError> {
    serde_json::to_string(&IssueMessage::from(event)).map_err(|e| PublishError {
        issue_id: event.issue_id().get(),
        reason: e.to_string(),
    })
}

/// Writes every issue event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPublisher;

impl IssueEventPublisher for LoggingPublisher {
    fn publish(&self, event: &IssueEvent) -> Result<(), PublishError> {
        let message = render(event)?;
        info!(issue_id = %event.issue_id(), message = %message, "Published issue event");
        Ok(())
    }
}

/// Keeps rendered messages in memory
///
/// Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct OutboxPublisher {
    messages: Arc<Mutex<Vec<String>>>,
}

impl OutboxPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every message published so far
    pub fn drain(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl IssueEventPublisher for OutboxPublisher {
    fn publish(&self, event: &IssueEvent) -> Result<(), PublishError> {
        let message = render(event)?;
        let mut messages = self.messages.lock().map_err(|_| PublishError {
            issue_id: event.issue_id().get(),
            reason: "outbox lock poisoned".to_string(),
        })?;
        messages.push(message);
        Ok(())
    }
}
