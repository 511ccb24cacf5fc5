//! EventConsumer - Feeds vehicle and user events into the relationship index
//!
//! ```text
//! broker / replay file
//!        │  one JSON envelope per message
//!        ▼
//!  EventConsumer::consume ──decode──► RelationshipIndex::apply
//!        │
//!        └── null / malformed ──► dropped (logged, counted)
//! ```
//!
//! Nothing here ever surfaces an error to the producer. A message that
//! cannot be decoded is dropped so the stream keeps moving.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use fleet_domain::{ApplyOutcome, Assignment, DomainEvent, RelationshipIndex};
use shared::FleetError;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::dto::{decode, DecodeError};

/// Totals for one batch of messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub dropped: usize,
}

/// EventConsumer
#[derive(Debug, Clone)]
pub struct EventConsumer {
    index: Arc<RelationshipIndex>,
}

impl EventConsumer {
    pub fn new(index: Arc<RelationshipIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<RelationshipIndex> {
        &self.index
    }

    /// Decode and apply one message
    pub fn consume(&self, message: &str) -> Option<ApplyOutcome> {
        match decode(message) {
            Ok(event) => Some(self.handle(&event)),
            Err(e) => {
                self.drop_message(&e);
                None
            }
        }
    }

    /// Apply an already decoded event
    pub fn handle(&self, event: &DomainEvent) -> ApplyOutcome {
        info!(kind = event.kind(), "Received event");

        let outcome = self.index.apply(event);
        log_outcome(&outcome);
        outcome
    }

    /// Consume newline-delimited messages; blank lines are skipped
    pub fn consume_lines<R: BufRead>(&self, reader: R) -> Result<ReplaySummary, FleetError> {
        let mut summary = ReplaySummary::default();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match self.consume(&line) {
                Some(_) => summary.applied += 1,
                None => summary.dropped += 1,
            }
        }

        Ok(summary)
    }

    /// Replay a JSON-lines file
    pub fn replay_file(&self, path: &Path) -> Result<ReplaySummary, FleetError> {
        let file = std::fs::File::open(path)?;
        let summary = self.consume_lines(std::io::BufReader::new(file))?;

        info!(
            path = %path.display(),
            applied = summary.applied,
            dropped = summary.dropped,
            "Replay finished"
        );
        Ok(summary)
    }

    /// Drain a channel until every sender is gone
    pub async fn run(self, mut rx: mpsc::Receiver<String>) -> ReplaySummary {
        let mut summary = ReplaySummary::default();

        while let Some(message) = rx.recv().await {
            match self.consume(&message) {
                Some(_) => summary.applied += 1,
                None => summary.dropped += 1,
            }
        }

        debug!(applied = summary.applied, dropped = summary.dropped, "Event channel closed");
        summary
    }

    fn drop_message(&self, reason: &DecodeError) {
        self.index.record_dropped();
        match reason {
            DecodeError::NullPayload { kind } => {
                error!(kind = %kind, "Received null event, skipping");
            }
            other => {
                error!(error = %other, "Undecodable event, skipping");
            }
        }
    }
}

fn log_outcome(outcome: &ApplyOutcome) {
    match outcome {
        ApplyOutcome::OwnershipRecorded {
            vehicle_id,
            manager_id,
        } => {
            info!(vehicle_id = %vehicle_id, manager_id = %manager_id, "Recorded vehicle owner");
        }
        ApplyOutcome::CarrierAssigned {
            carrier_id,
            vehicle_id,
            manager_id,
            assignment,
        } => {
            info!(carrier_id = %carrier_id, vehicle_id = %vehicle_id, "Linked carrier to vehicle");
            match manager_id {
                Some(manager_id) => {
                    info!(carrier_id = %carrier_id, manager_id = %manager_id, "Backfilled carrier manager");
                }
                None => {
                    warn!(vehicle_id = %vehicle_id, "Manager not found for vehicle; carrier's manager stays unresolved");
                }
            }
            match assignment {
                Assignment::Shared { with } => {
                    warn!(
                        vehicle_id = %vehicle_id,
                        carrier_id = %carrier_id,
                        other_carrier_id = %with,
                        "Vehicle already assigned to another carrier"
                    );
                }
                Assignment::Moved { from } => {
                    debug!(carrier_id = %carrier_id, from = %from, to = %vehicle_id, "Carrier changed vehicle");
                }
                Assignment::New | Assignment::Unchanged => {}
            }
        }
        ApplyOutcome::CarrierUnassigned {
            carrier_id,
            vehicle_id,
            backfilled,
        } => {
            info!(carrier_id = %carrier_id, vehicle_id = %vehicle_id, "Removed carrier from vehicle");
            if backfilled.is_none() {
                warn!(vehicle_id = %vehicle_id, "Manager not found for vehicle; nothing backfilled");
            }
        }
        ApplyOutcome::NothingToUnassign { vehicle_id } => {
            debug!(vehicle_id = %vehicle_id, "No carrier on vehicle to unassign");
        }
        ApplyOutcome::IdentityIgnored { user_id } => {
            debug!(user_id = %user_id, "Identity event carries no relationship data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRelationshipStore;
    use fleet_domain::{CarrierId, ManagerId, VehicleId};
    use std::io::{Cursor, Write};

    fn create_consumer() -> EventConsumer {
        let store = Arc::new(InMemoryRelationshipStore::new());
        EventConsumer::new(Arc::new(RelationshipIndex::new(store)))
    }

    const CREATED: &str = r#"{"type":"vehicleCreatedEvent","payload":{"vehicleId":1,"managerId":10,"licensePlate":"ABC-123","brand":"Volvo","model":"FH16","status":"ACTIVE"}}"#;
    const ASSIGNED: &str = r#"{"type":"vehicleUpdatedEvent","payload":{"vehicleId":1,"carrierId":100}}"#;
    const UNASSIGNED: &str = r#"{"type":"vehicleUpdatedEvent","payload":{"vehicleId":1,"carrierId":null}}"#;

    #[test]
    fn test_consume_builds_links() {
        let consumer = create_consumer();

        consumer.consume(CREATED).unwrap();
        let outcome = consumer.consume(ASSIGNED).unwrap();

        assert!(matches!(
            outcome,
            ApplyOutcome::CarrierAssigned { manager_id: Some(m), .. } if m == ManagerId::new(10)
        ));
        assert_eq!(
            consumer.index().manager_for_carrier(CarrierId::new(100)),
            Some(ManagerId::new(10))
        );

        consumer.consume(UNASSIGNED).unwrap();
        assert_eq!(consumer.index().vehicle_for_carrier(CarrierId::new(100)), None);
        assert_eq!(
            consumer.index().manager_for_carrier(CarrierId::new(100)),
            Some(ManagerId::new(10))
        );
    }

    #[test]
    fn test_null_and_garbage_are_dropped() {
        let consumer = create_consumer();

        assert!(consumer.consume(r#"{"type":"vehicleUpdatedEvent","payload":null}"#).is_none());
        assert!(consumer.consume("null").is_none());
        assert!(consumer.consume("][").is_none());

        let stats = consumer.index().stats();
        assert_eq!(stats.events_dropped, 3);
        assert_eq!(stats.events_applied, 0);
    }

    #[test]
    fn test_consume_lines_counts() {
        let consumer = create_consumer();
        let input = format!("{}\n\n{}\nnull\n", CREATED, ASSIGNED);

        let summary = consumer.consume_lines(Cursor::new(input)).unwrap();

        assert_eq!(summary, ReplaySummary { applied: 2, dropped: 1 });
        assert_eq!(
            consumer.index().vehicle_for_carrier(CarrierId::new(100)),
            Some(VehicleId::new(1))
        );
    }

    #[test]
    fn test_replay_file() {
        let consumer = create_consumer();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", ASSIGNED).unwrap();
        writeln!(file, "{}", CREATED).unwrap();

        let summary = consumer.replay_file(file.path()).unwrap();

        assert_eq!(summary.applied, 2);
        // Assignment came first; the direct path resolves once the vehicle exists
        assert_eq!(
            consumer.index().vehicle_for_carrier(CarrierId::new(100)),
            Some(VehicleId::new(1))
        );
        assert_eq!(
            consumer.index().manager_for_carrier(CarrierId::new(100)),
            Some(ManagerId::new(10))
        );
    }

    #[test]
    fn test_replay_missing_file() {
        let consumer = create_consumer();
        let result = consumer.replay_file(Path::new("/nonexistent/events.jsonl"));
        assert!(matches!(result, Err(FleetError::Io(_))));
    }

    #[tokio::test]
    async fn test_run_drains_channel() {
        let consumer = create_consumer();
        let index = consumer.index().clone();
        let (tx, rx) = mpsc::channel(8);

        let task = tokio::spawn(consumer.run(rx));
        tx.send(CREATED.to_string()).await.unwrap();
        tx.send(ASSIGNED.to_string()).await.unwrap();
        tx.send("null".to_string()).await.unwrap();
        drop(tx);

        let summary = task.await.unwrap();
        assert_eq!(summary, ReplaySummary { applied: 2, dropped: 1 });
        assert_eq!(index.manager_for_carrier(CarrierId::new(100)), Some(ManagerId::new(10)));
    }
}
