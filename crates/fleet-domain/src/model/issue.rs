//! Issue - A problem reported by a carrier
//!
//! Issue is an Entity: the id is assigned by the repository on insert and
//! identity is decided by id alone.

use super::ids::{CarrierId, IssueId, ManagerId, ShipmentId, VehicleId};

/// Category of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueType {
    Vehicle,
    Route,
    Shipment,
    Technical,
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 5] = [
        IssueType::Vehicle,
        IssueType::Route,
        IssueType::Shipment,
        IssueType::Technical,
        IssueType::Other,
    ];

    /// Whether an issue of this type must reference the carrier's vehicle
    pub fn requires_vehicle(&self) -> bool {
        matches!(self, IssueType::Vehicle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Vehicle => "VEHICLE",
            IssueType::Route => "ROUTE",
            IssueType::Shipment => "SHIPMENT",
            IssueType::Technical => "TECHNICAL",
            IssueType::Other => "OTHER",
        }
    }

    /// Parse the wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl core::fmt::Display for IssueType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to persist a new issue, before an id exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub content: String,
    pub issue_type: IssueType,
    /// RFC 3339 timestamp
    pub reported_at: String,
    pub carrier_id: CarrierId,
    pub manager_id: ManagerId,
    pub vehicle_id: Option<VehicleId>,
    pub shipment_id: Option<ShipmentId>,
}

#[derive(Debug, Clone)]
pub struct Issue {
    id: IssueId,
    title: String,
    content: String,
    issue_type: IssueType,
    reported_at: String,
    carrier_id: CarrierId,
    manager_id: ManagerId,
    vehicle_id: Option<VehicleId>,
    shipment_id: Option<ShipmentId>,
}

impl Issue {
    pub fn from_draft(id: IssueId, draft: IssueDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            issue_type: draft.issue_type,
            reported_at: draft.reported_at,
            carrier_id: draft.carrier_id,
            manager_id: draft.manager_id,
            vehicle_id: draft.vehicle_id,
            shipment_id: draft.shipment_id,
        }
    }

    // ========== Getters ==========

    pub fn id(&self) -> IssueId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn issue_type(&self) -> IssueType {
        self.issue_type
    }

    pub fn reported_at(&self) -> &str {
        &self.reported_at
    }

    pub fn carrier_id(&self) -> CarrierId {
        self.carrier_id
    }

    pub fn manager_id(&self) -> ManagerId {
        self.manager_id
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        self.vehicle_id
    }

    pub fn shipment_id(&self) -> Option<ShipmentId> {
        self.shipment_id
    }

    // ========== Mutations ==========

    pub fn update_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn update_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Change the category. The vehicle reference is left untouched; it was
    /// resolved when the issue was filed.
    pub fn update_type(&mut self, issue_type: IssueType) {
        self.issue_type = issue_type;
    }

    /// Snapshot published after creation
    pub fn created_event(&self) -> IssueEvent {
        IssueEvent::Created(IssueCreated {
            issue_id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            issue_type: self.issue_type,
            reported_at: self.reported_at.clone(),
            carrier_id: self.carrier_id,
            manager_id: self.manager_id,
            vehicle_id: self.vehicle_id,
            shipment_id: self.shipment_id,
        })
    }
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Issue {}

/// Published when an issue is filed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCreated {
    pub issue_id: IssueId,
    pub title: String,
    pub content: String,
    pub issue_type: IssueType,
    pub reported_at: String,
    pub carrier_id: CarrierId,
    pub manager_id: ManagerId,
    pub vehicle_id: Option<VehicleId>,
    pub shipment_id: Option<ShipmentId>,
}

/// Published when an issue changes; only changed fields are set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueUpdated {
    pub issue_id: IssueId,
    pub title: Option<String>,
    pub content: Option<String>,
    pub issue_type: Option<IssueType>,
}

/// Outbound events of the issues service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueEvent {
    Created(IssueCreated),
    Updated(IssueUpdated),
}

impl IssueEvent {
    pub fn issue_id(&self) -> IssueId {
        match self {
            IssueEvent::Created(e) => e.issue_id,
            IssueEvent::Updated(e) => e.issue_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> IssueDraft {
        IssueDraft {
            title: "Flat tire".to_string(),
            content: "Rear left tire is flat".to_string(),
            issue_type: IssueType::Vehicle,
            reported_at: "2024-05-01T10:00:00+00:00".to_string(),
            carrier_id: CarrierId::new(100),
            manager_id: ManagerId::new(10),
            vehicle_id: Some(VehicleId::new(1)),
            shipment_id: None,
        }
    }

    #[test]
    fn test_only_vehicle_type_requires_vehicle() {
        assert!(IssueType::Vehicle.requires_vehicle());
        for t in [IssueType::Route, IssueType::Shipment, IssueType::Technical, IssueType::Other] {
            assert!(!t.requires_vehicle());
        }
    }

    #[test]
    fn test_parse_issue_type() {
        assert_eq!(IssueType::parse("vehicle"), Some(IssueType::Vehicle));
        assert_eq!(IssueType::parse(" ROUTE "), Some(IssueType::Route));
        assert_eq!(IssueType::parse("weather"), None);
    }

    #[test]
    fn test_entity_equality_by_id() {
        let a = Issue::from_draft(IssueId::new(1), draft());
        let mut b = Issue::from_draft(IssueId::new(1), draft());
        b.update_title("Something else");

        assert_eq!(a, b);
    }

    #[test]
    fn test_created_event_carries_links() {
        let issue = Issue::from_draft(IssueId::new(5), draft());

        match issue.created_event() {
            IssueEvent::Created(e) => {
                assert_eq!(e.issue_id, IssueId::new(5));
                assert_eq!(e.manager_id, ManagerId::new(10));
                assert_eq!(e.vehicle_id, Some(VehicleId::new(1)));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
