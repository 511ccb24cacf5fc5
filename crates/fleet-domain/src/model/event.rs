//! Inbound domain events published by the vehicles and identity services
//!
//! The set is closed: every consumer matches on [`DomainEvent`]
//! exhaustively, so a new event kind is a compile error everywhere it
//! needs handling rather than a silently ignored message.

use super::ids::{CarrierId, ManagerId, UserId, VehicleId};

/// Operational status reported by the vehicles service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleStatus {
    Active,
    Inactive,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "ACTIVE",
            VehicleStatus::Inactive => "INACTIVE",
            VehicleStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl core::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vehicle was registered by a manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleCreated {
    pub vehicle_id: VehicleId,
    pub manager_id: ManagerId,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub status: VehicleStatus,
}

/// A vehicle changed
///
/// `carrier_id` is the carrier assigned after the change. `None` means the
/// vehicle no longer has a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleUpdated {
    pub vehicle_id: VehicleId,
    pub carrier_id: Option<CarrierId>,
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub status: Option<VehicleStatus>,
}

impl VehicleUpdated {
    /// An update that only changes the carrier assignment
    pub fn assignment(vehicle_id: VehicleId, carrier_id: Option<CarrierId>) -> Self {
        Self {
            vehicle_id,
            carrier_id,
            license_plate: None,
            brand: None,
            model: None,
            status: None,
        }
    }
}

/// A user was registered in the identity service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCreated {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<String>,
}

/// A user changed in the identity service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdated {
    pub user_id: UserId,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Every event the issues service consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    VehicleCreated(VehicleCreated),
    VehicleUpdated(VehicleUpdated),
    UserCreated(UserCreated),
    UserUpdated(UserUpdated),
}

impl DomainEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::VehicleCreated(_) => "VehicleCreated",
            DomainEvent::VehicleUpdated(_) => "VehicleUpdated",
            DomainEvent::UserCreated(_) => "UserCreated",
            DomainEvent::UserUpdated(_) => "UserUpdated",
        }
    }
}

impl From<VehicleCreated> for DomainEvent {
    fn from(event: VehicleCreated) -> Self {
        DomainEvent::VehicleCreated(event)
    }
}

impl From<VehicleUpdated> for DomainEvent {
    fn from(event: VehicleUpdated) -> Self {
        DomainEvent::VehicleUpdated(event)
    }
}

impl From<UserCreated> for DomainEvent {
    fn from(event: UserCreated) -> Self {
        DomainEvent::UserCreated(event)
    }
}

impl From<UserUpdated> for DomainEvent {
    fn from(event: UserUpdated) -> Self {
        DomainEvent::UserUpdated(event)
    }
}
