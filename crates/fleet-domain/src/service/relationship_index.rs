//! Relationship Index - Who manages a carrier, and what it drives
//!
//! The issues service never asks the vehicles service anything. Instead it
//! watches vehicle events and keeps just enough derived state to answer:
//!
//! 1. Which manager does this carrier work for?
//! 2. Which vehicle is this carrier on right now?
//!
//! Events arrive at least once and in no particular order across topics.
//! Every handler is therefore a plain overwrite or removal that can be
//! replayed safely.
//!
//! ## Backfill
//!
//! Manager answers outlive vehicle answers. Whenever a carrier is linked
//! to a vehicle whose owner is known, and again when the carrier leaves
//! that vehicle, the owner is copied into the carrier's backfill entry.
//! `manager_for_carrier` falls back to it once the direct
//! carrier → vehicle → manager path breaks. `vehicle_for_carrier` has no
//! such fallback.
//!
//! ## Ordering
//!
//! An assignment seen before the vehicle's creation leaves the manager
//! unresolved. Once the creation arrives the direct path resolves on the
//! next lookup; nothing is backfilled retroactively until another update
//! for that vehicle arrives.
//!
//! This is pure domain logic - the outcome of each event is returned so
//! the caller can log it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::model::event::{DomainEvent, VehicleCreated, VehicleUpdated};
use crate::model::ids::{CarrierId, ManagerId, UserId, VehicleId};
use crate::repository::relationship_store::{Assignment, RelationshipStore};

/// What applying one event did to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Vehicle owner recorded
    OwnershipRecorded {
        vehicle_id: VehicleId,
        manager_id: ManagerId,
    },
    /// Carrier linked to a vehicle
    CarrierAssigned {
        carrier_id: CarrierId,
        vehicle_id: VehicleId,
        /// Owner of the vehicle, if already known
        manager_id: Option<ManagerId>,
        assignment: Assignment,
    },
    /// Carrier removed from a vehicle
    CarrierUnassigned {
        carrier_id: CarrierId,
        vehicle_id: VehicleId,
        /// Manager retained for the carrier, if the owner was known
        backfilled: Option<ManagerId>,
    },
    /// Unassignment for a vehicle nobody is on
    NothingToUnassign { vehicle_id: VehicleId },
    /// Identity events carry nothing this index needs
    IdentityIgnored { user_id: UserId },
}

impl ApplyOutcome {
    /// Whether the outcome exposes two carriers mapped to one vehicle
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ApplyOutcome::CarrierAssigned {
                assignment: Assignment::Shared { .. },
                ..
            }
        )
    }
}

/// Counters describing the index's life so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Vehicle events that reached the store
    pub events_applied: u64,
    /// Identity events accepted without effect
    pub identity_events_ignored: u64,
    /// Null or undecodable messages reported by the consumer
    pub events_dropped: u64,
    /// Times two carriers were seen on one vehicle
    pub invariant_violations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    applied: AtomicU64,
    ignored: AtomicU64,
    dropped: AtomicU64,
    invariant_violations: AtomicU64,
}

/// RelationshipIndex - Event ingestion and resolution over a store
///
/// Constructed once at startup and shared by `Arc` between the event
/// consumer and request handlers. Reads take no index-level lock; writes
/// are serialized so the steps of two events never interleave.
pub struct RelationshipIndex {
    store: Arc<dyn RelationshipStore>,
    writer: Mutex<()>,
    counters: Counters,
}

impl RelationshipIndex {
    /// Create a new RelationshipIndex
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    // ========== Ingestion ==========

    /// Apply one event
    pub fn apply(&self, event: &DomainEvent) -> ApplyOutcome {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let outcome = match event {
            DomainEvent::VehicleCreated(created) => self.on_vehicle_created(created),
            DomainEvent::VehicleUpdated(updated) => match updated.carrier_id {
                Some(carrier_id) => self.on_carrier_assigned(updated.vehicle_id, carrier_id),
                None => self.on_carrier_removed(updated),
            },
            DomainEvent::UserCreated(created) => ApplyOutcome::IdentityIgnored {
                user_id: created.user_id,
            },
            DomainEvent::UserUpdated(updated) => ApplyOutcome::IdentityIgnored {
                user_id: updated.user_id,
            },
        };

        match &outcome {
            ApplyOutcome::IdentityIgnored { .. } => {
                self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            }
            other => {
                self.counters.applied.fetch_add(1, Ordering::Relaxed);
                if other.is_invariant_violation() {
                    self.counters
                        .invariant_violations
                        .fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        outcome
    }

    /// Record a message that never became an event
    pub fn record_dropped(&self) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn on_vehicle_created(&self, event: &VehicleCreated) -> ApplyOutcome {
        self.store
            .put_vehicle_manager(event.vehicle_id, event.manager_id);

        ApplyOutcome::OwnershipRecorded {
            vehicle_id: event.vehicle_id,
            manager_id: event.manager_id,
        }
    }

    fn on_carrier_assigned(&self, vehicle_id: VehicleId, carrier_id: CarrierId) -> ApplyOutcome {
        let assignment = self.store.put_carrier_vehicle(carrier_id, vehicle_id);

        // Keep the backfill fresh while assigned
        let manager_id = self.store.vehicle_manager(vehicle_id);
        if let Some(manager_id) = manager_id {
            self.store.put_carrier_manager_backfill(carrier_id, manager_id);
        }

        ApplyOutcome::CarrierAssigned {
            carrier_id,
            vehicle_id,
            manager_id,
            assignment,
        }
    }

    fn on_carrier_removed(&self, event: &VehicleUpdated) -> ApplyOutcome {
        let vehicle_id = event.vehicle_id;

        let Some(carrier_id) = self.store.vehicle_carrier(vehicle_id) else {
            return ApplyOutcome::NothingToUnassign { vehicle_id };
        };

        // Backfill first so a concurrent reader always finds one of the two paths
        let backfilled = self.store.vehicle_manager(vehicle_id);
        if let Some(manager_id) = backfilled {
            self.store.put_carrier_manager_backfill(carrier_id, manager_id);
        }

        self.store.remove_carrier_vehicle(carrier_id);

        ApplyOutcome::CarrierUnassigned {
            carrier_id,
            vehicle_id,
            backfilled,
        }
    }

    // ========== Resolution ==========

    /// The manager a carrier works for
    ///
    /// Tries carrier → vehicle → manager first, then the backfill.
    pub fn manager_for_carrier(
        &self,
        carrier_id: impl Into<Option<CarrierId>>,
    ) -> Option<ManagerId> {
        let carrier_id = carrier_id.into()?;

        self.store
            .carrier_vehicle(carrier_id)
            .and_then(|vehicle_id| self.store.vehicle_manager(vehicle_id))
            .or_else(|| self.store.carrier_manager_backfill(carrier_id))
    }

    /// The vehicle a carrier is currently assigned to
    pub fn vehicle_for_carrier(
        &self,
        carrier_id: impl Into<Option<CarrierId>>,
    ) -> Option<VehicleId> {
        let carrier_id = carrier_id.into()?;
        self.store.carrier_vehicle(carrier_id)
    }

    pub fn has_vehicle_assigned(&self, carrier_id: CarrierId) -> bool {
        self.store.has_carrier_vehicle(carrier_id)
    }

    /// Get statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            events_applied: self.counters.applied.load(Ordering::Relaxed),
            identity_events_ignored: self.counters.ignored.load(Ordering::Relaxed),
            events_dropped: self.counters.dropped.load(Ordering::Relaxed),
            invariant_violations: self.counters.invariant_violations.load(Ordering::Relaxed),
        }
    }
}

impl core::fmt::Debug for RelationshipIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RelationshipIndex")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
