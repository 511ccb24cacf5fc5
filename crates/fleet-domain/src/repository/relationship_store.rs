//! Relationship Store - Derived links between vehicles, carriers and managers
//!
//! Unlike the issue repository this port is infallible: an absent key is
//! an answer, not an error, and the request path must never fail because
//! of the index.

use crate::model::ids::{CarrierId, ManagerId, VehicleId};

/// What `put_carrier_vehicle` found before it wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// The carrier had no vehicle
    New,
    /// The carrier was already on this vehicle
    Unchanged,
    /// The carrier left another vehicle
    Moved { from: VehicleId },
    /// Another carrier is still mapped to this vehicle. Both mappings are
    /// kept; the new carrier becomes the vehicle's most recent occupant.
    Shared { with: CarrierId },
}

/// Relationship Store Trait
///
/// This is a PORT in hexagonal architecture. Implementations must be safe
/// to read and write from several threads at once, and every method must
/// be atomic with respect to concurrent readers.
///
/// Four maps make up the state:
///
/// | map                 | key       | value     | deleted? |
/// |---------------------|-----------|-----------|----------|
/// | vehicle ownership   | vehicle   | manager   | never    |
/// | carrier assignment  | carrier   | vehicle   | on unassignment |
/// | manager backfill    | carrier   | manager   | never    |
/// | vehicle occupants   | vehicle   | carriers, most recent last | with their assignments |
///
/// The occupants map is the reverse of the assignment map and is maintained
/// by `put_carrier_vehicle` / `remove_carrier_vehicle`; callers never write
/// it directly.
pub trait RelationshipStore: Send + Sync {
    /// Record the owner of a vehicle (last write wins)
    fn put_vehicle_manager(&self, vehicle_id: VehicleId, manager_id: ManagerId);

    /// Assign a carrier to a vehicle (last write wins)
    fn put_carrier_vehicle(&self, carrier_id: CarrierId, vehicle_id: VehicleId) -> Assignment;

    /// Drop a carrier's assignment, returning the vehicle it had
    fn remove_carrier_vehicle(&self, carrier_id: CarrierId) -> Option<VehicleId>;

    /// Remember the manager a carrier last worked under
    fn put_carrier_manager_backfill(&self, carrier_id: CarrierId, manager_id: ManagerId);

    fn vehicle_manager(&self, vehicle_id: VehicleId) -> Option<ManagerId>;

    fn carrier_vehicle(&self, carrier_id: CarrierId) -> Option<VehicleId>;

    fn carrier_manager_backfill(&self, carrier_id: CarrierId) -> Option<ManagerId>;

    /// Reverse lookup: the most recently assigned carrier still on a vehicle.
    /// Once that carrier is removed, the next most recent one is returned.
    fn vehicle_carrier(&self, vehicle_id: VehicleId) -> Option<CarrierId>;

    /// Check if a carrier has a vehicle
    fn has_carrier_vehicle(&self, carrier_id: CarrierId) -> bool {
        self.carrier_vehicle(carrier_id).is_some()
    }
}
