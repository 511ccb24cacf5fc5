//! Wire formats
//!
//! Inbound messages arrive wrapped in an envelope naming the binding they
//! came from:
//!
//! ```text
//! { "type": "vehicleUpdatedEvent", "payload": { "vehicleId": 1, "carrierId": 100 } }
//! ```
//!
//! Payload field names are camelCase. A `null` or absent payload is a
//! null event and never reaches the index.

use fleet_domain::{
    CarrierId, DomainEvent, IssueEvent, ManagerId, UserCreated, UserId, UserUpdated,
    VehicleCreated, VehicleId, VehicleStatus, VehicleUpdated,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const VEHICLE_CREATED: &str = "vehicleCreatedEvent";
pub const VEHICLE_UPDATED: &str = "vehicleUpdatedEvent";
pub const USER_CREATED: &str = "userCreatedEvent";
pub const USER_UPDATED: &str = "userUpdatedEvent";

/// Why a message could not become a domain event
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown event type: {0}")]
    UnknownType(String),

    #[error("Null {kind} event")]
    NullPayload { kind: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatusDto {
    Active,
    Inactive,
    Maintenance,
}

impl From<VehicleStatusDto> for VehicleStatus {
    fn from(status: VehicleStatusDto) -> Self {
        match status {
            VehicleStatusDto::Active => VehicleStatus::Active,
            VehicleStatusDto::Inactive => VehicleStatus::Inactive,
            VehicleStatusDto::Maintenance => VehicleStatus::Maintenance,
        }
    }
}

impl From<VehicleStatus> for VehicleStatusDto {
    fn from(status: VehicleStatus) -> Self {
        match status {
            VehicleStatus::Active => VehicleStatusDto::Active,
            VehicleStatus::Inactive => VehicleStatusDto::Inactive,
            VehicleStatus::Maintenance => VehicleStatusDto::Maintenance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCreatedEvent {
    pub vehicle_id: i64,
    pub manager_id: i64,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    pub status: VehicleStatusDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdatedEvent {
    pub vehicle_id: i64,
    #[serde(default)]
    pub carrier_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatusDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatedEvent {
    pub user_id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdatedEvent {
    pub user_id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl From<VehicleCreatedEvent> for DomainEvent {
    fn from(dto: VehicleCreatedEvent) -> Self {
        DomainEvent::VehicleCreated(VehicleCreated {
            vehicle_id: VehicleId::new(dto.vehicle_id),
            manager_id: ManagerId::new(dto.manager_id),
            license_plate: dto.license_plate,
            brand: dto.brand,
            model: dto.model,
            status: dto.status.into(),
        })
    }
}

impl From<VehicleUpdatedEvent> for DomainEvent {
    fn from(dto: VehicleUpdatedEvent) -> Self {
        DomainEvent::VehicleUpdated(VehicleUpdated {
            vehicle_id: VehicleId::new(dto.vehicle_id),
            carrier_id: dto.carrier_id.map(CarrierId::new),
            license_plate: dto.license_plate,
            brand: dto.brand,
            model: dto.model,
            status: dto.status.map(Into::into),
        })
    }
}

impl From<UserCreatedEvent> for DomainEvent {
    fn from(dto: UserCreatedEvent) -> Self {
        DomainEvent::UserCreated(UserCreated {
            user_id: UserId::new(dto.user_id),
            email: dto.email,
            roles: dto.roles,
        })
    }
}

impl From<UserUpdatedEvent> for DomainEvent {
    fn from(dto: UserUpdatedEvent) -> Self {
        DomainEvent::UserUpdated(UserUpdated {
            user_id: UserId::new(dto.user_id),
            email: dto.email,
            roles: dto.roles,
        })
    }
}

/// Decode one enveloped message into a domain event
pub fn decode(message: &str) -> Result<DomainEvent, DecodeError> {
    let envelope: Envelope = serde_json::from_str(message)?;
    decode_envelope(envelope)
}

pub fn decode_envelope(envelope: Envelope) -> Result<DomainEvent, DecodeError> {
    if envelope.payload.is_null() {
        return Err(DecodeError::NullPayload {
            kind: envelope.kind,
        });
    }

    let payload = envelope.payload;
    let event = match envelope.kind.as_str() {
        VEHICLE_CREATED => serde_json::from_value::<VehicleCreatedEvent>(payload)?.into(),
        VEHICLE_UPDATED => serde_json::from_value::<VehicleUpdatedEvent>(payload)?.into(),
        USER_CREATED => serde_json::from_value::<UserCreatedEvent>(payload)?.into(),
        USER_UPDATED => serde_json::from_value::<UserUpdatedEvent>(payload)?.into(),
        _ => return Err(DecodeError::UnknownType(envelope.kind.clone())),
    };
    Ok(event)
}

/// Encode a domain event the way producers put it on the wire
pub fn encode(event: &DomainEvent) -> Result<String, serde_json::Error> {
    let (kind, payload) = match event {
        DomainEvent::VehicleCreated(e) => (
            VEHICLE_CREATED,
            serde_json::to_value(VehicleCreatedEvent {
                vehicle_id: e.vehicle_id.get(),
                manager_id: e.manager_id.get(),
                license_plate: e.license_plate.clone(),
                brand: e.brand.clone(),
                model: e.model.clone(),
                status: e.status.into(),
            })?,
        ),
        DomainEvent::VehicleUpdated(e) => (
            VEHICLE_UPDATED,
            serde_json::to_value(VehicleUpdatedEvent {
                vehicle_id: e.vehicle_id.get(),
                carrier_id: e.carrier_id.map(CarrierId::get),
                license_plate: e.license_plate.clone(),
                brand: e.brand.clone(),
                model: e.model.clone(),
                status: e.status.map(Into::into),
            })?,
        ),
        DomainEvent::UserCreated(e) => (
            USER_CREATED,
            serde_json::to_value(UserCreatedEvent {
                user_id: e.user_id.get(),
                email: e.email.clone(),
                roles: e.roles.clone(),
            })?,
        ),
        DomainEvent::UserUpdated(e) => (
            USER_UPDATED,
            serde_json::to_value(UserUpdatedEvent {
                user_id: e.user_id.get(),
                email: e.email.clone(),
                roles: e.roles.clone(),
            })?,
        ),
    };

    serde_json::to_string(&Envelope {
        kind: kind.to_string(),
        payload,
    })
}

// ========== Outbound ==========

/// `issueCreatedEvent` / `issueUpdatedEvent` payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum IssueMessage {
    #[serde(rename = "issueCreatedEvent")]
    Created(IssueCreatedEvent),
    #[serde(rename = "issueUpdatedEvent")]
    Updated(IssueUpdatedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreatedEvent {
    pub issue_id: i64,
    pub title: String,
    pub content: String,
    pub issue_type: String,
    pub reported_at: String,
    pub carrier_id: i64,
    pub manager_id: i64,
    pub vehicle_id: Option<i64>,
    pub shipment_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdatedEvent {
    pub issue_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
}

impl From<&IssueEvent> for IssueMessage {
    fn from(event: &IssueEvent) -> Self {
        match event {
            IssueEvent::Created(e) => IssueMessage::Created(IssueCreatedEvent {
                issue_id: e.issue_id.get(),
                title: e.title.clone(),
                content: e.content.clone(),
                issue_type: e.issue_type.as_str().to_string(),
                reported_at: e.reported_at.clone(),
                carrier_id: e.carrier_id.get(),
                manager_id: e.manager_id.get(),
                vehicle_id: e.vehicle_id.map(VehicleId::get),
                shipment_id: e.shipment_id.map(|id| id.get()),
            }),
            IssueEvent::Updated(e) => IssueMessage::Updated(IssueUpdatedEvent {
                issue_id: e.issue_id.get(),
                title: e.title.clone(),
                content: e.content.clone(),
                issue_type: e.issue_type.map(|t| t.as_str().to_string()),
            }),
        }
    }
}
