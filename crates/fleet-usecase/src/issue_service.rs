//! IssueService - Filing, reading and changing issues
//!
//! Filing is the only operation that touches the relationship index:
//!
//! 1. The caller must be an authenticated carrier.
//! 2. The carrier's manager must resolve, or the request is rejected.
//! 3. For VEHICLE issues the carrier's vehicle must resolve too.
//!
//! Nothing is retried or queued. An unresolved lookup is a rejection the
//! client sees immediately.

use std::sync::Arc;

use fleet_domain::{
    CarrierId, Issue, IssueDraft, IssueEvent, IssueId, IssueRepository, IssueType, IssueUpdated,
    ManagerId, RelationshipIndex, ShipmentId,
};
use shared::role::{CARRIER, MANAGER};
use tracing::{info, warn};

use crate::caller::CallerIdentity;
use crate::error::IssueError;
use crate::publisher::IssueEventPublisher;

const MAX_TITLE_LEN: usize = 255;
const MAX_CONTENT_LEN: usize = 2000;

/// A carrier's report, as submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssueRequest {
    pub title: String,
    pub content: String,
    pub issue_type: IssueType,
    pub shipment_id: Option<ShipmentId>,
}

impl CreateIssueRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>, issue_type: IssueType) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            issue_type,
            shipment_id: None,
        }
    }

    /// Builder: reference a shipment
    pub fn with_shipment(mut self, shipment_id: ShipmentId) -> Self {
        self.shipment_id = Some(shipment_id);
        self
    }
}

/// Partial change to an issue; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateIssueRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub issue_type: Option<IssueType>,
}

/// IssueService
pub struct IssueService<R, P> {
    index: Arc<RelationshipIndex>,
    repository: R,
    publisher: P,
}

impl<R, P> IssueService<R, P>
where
    R: IssueRepository,
    P: IssueEventPublisher,
{
    pub fn new(index: Arc<RelationshipIndex>, repository: R, publisher: P) -> Self {
        Self {
            index,
            repository,
            publisher,
        }
    }

    // ========== Commands ==========

    /// The carrier a caller may file issues as. Checked before anything
    /// about the request itself.
    pub fn authorize_create(&self, caller: &CallerIdentity) -> Result<CarrierId, IssueError> {
        let user_id = caller.user_id().ok_or(IssueError::Unauthenticated)?;
        if !caller.has_role(CARRIER) {
            return Err(IssueError::forbidden("only carriers can file issues"));
        }
        Ok(CarrierId::from(user_id))
    }

    /// File a new issue on behalf of a carrier
    pub fn create(
        &mut self,
        caller: &CallerIdentity,
        request: CreateIssueRequest,
    ) -> Result<Issue, IssueError> {
        let carrier_id = self.authorize_create(caller)?;
        validate_text("title", &request.title, MAX_TITLE_LEN)?;
        validate_text("content", &request.content, MAX_CONTENT_LEN)?;

        let manager_id = self.index.manager_for_carrier(carrier_id).ok_or_else(|| {
            warn!(carrier_id = %carrier_id, "manager unresolved; carrier must be assigned to a vehicle first");
            IssueError::ManagerUnresolved { carrier_id }
        })?;

        let vehicle_id = if request.issue_type.requires_vehicle() {
            let vehicle_id = self.index.vehicle_for_carrier(carrier_id).ok_or_else(|| {
                warn!(carrier_id = %carrier_id, issue_type = %request.issue_type, "vehicle unresolved");
                IssueError::VehicleUnresolved { carrier_id }
            })?;
            info!(carrier_id = %carrier_id, vehicle_id = %vehicle_id, "attaching carrier's vehicle to issue");
            Some(vehicle_id)
        } else {
            None
        };

        let issue = self.repository.insert(IssueDraft {
            title: request.title,
            content: request.content,
            issue_type: request.issue_type,
            reported_at: chrono::Utc::now().to_rfc3339(),
            carrier_id,
            manager_id,
            vehicle_id,
            shipment_id: request.shipment_id,
        })?;

        self.announce(&issue.created_event());
        Ok(issue)
    }

    /// Change an issue; only the carrier who filed it may
    pub fn update(
        &mut self,
        caller: &CallerIdentity,
        id: IssueId,
        request: UpdateIssueRequest,
    ) -> Result<Issue, IssueError> {
        let mut issue = self.find(id)?;

        let is_author = caller
            .user_id()
            .is_some_and(|user| CarrierId::from(user) == issue.carrier_id());
        if !is_author {
            return Err(IssueError::forbidden("only the reporting carrier can update an issue"));
        }

        if let Some(title) = &request.title {
            validate_text("title", title, MAX_TITLE_LEN)?;
        }
        if let Some(content) = &request.content {
            validate_text("content", content, MAX_CONTENT_LEN)?;
        }

        if let Some(title) = &request.title {
            issue.update_title(title.clone());
        }
        if let Some(content) = &request.content {
            issue.update_content(content.clone());
        }
        if let Some(issue_type) = request.issue_type {
            issue.update_type(issue_type);
        }
        self.repository.save(&issue)?;

        self.announce(&IssueEvent::Updated(IssueUpdated {
            issue_id: issue.id(),
            title: request.title,
            content: request.content,
            issue_type: request.issue_type,
        }));
        Ok(issue)
    }

    /// Delete an issue; admins or the reporting carrier
    pub fn delete(&mut self, caller: &CallerIdentity, id: IssueId) -> Result<(), IssueError> {
        let issue = self.find(id)?;

        let user_id = caller
            .user_id()
            .ok_or_else(|| IssueError::forbidden("anonymous callers cannot delete issues"))?;
        if !caller.is_admin() && CarrierId::from(user_id) != issue.carrier_id() {
            return Err(IssueError::forbidden("only admins or the reporting carrier can delete an issue"));
        }

        if self.repository.delete(id)? {
            Ok(())
        } else {
            Err(IssueError::NotFound { id })
        }
    }

    // ========== Queries ==========

    pub fn get(&self, caller: &CallerIdentity, id: IssueId) -> Result<Issue, IssueError> {
        let issue = self.find(id)?;
        if !can_access(caller, &issue) {
            return Err(IssueError::forbidden("not allowed to read this issue"));
        }
        Ok(issue)
    }

    /// Issues filed by the calling carrier
    pub fn list_for_caller_carrier(&self, caller: &CallerIdentity) -> Result<Vec<Issue>, IssueError> {
        caller.user_id().ok_or(IssueError::Unauthenticated)?;
        let carrier_id = caller
            .as_carrier()
            .ok_or_else(|| IssueError::forbidden("caller is not a carrier"))?;

        Ok(self.repository.find_by_carrier(carrier_id)?)
    }

    /// Issues filed by a carrier; admins or that carrier
    pub fn list_by_carrier(
        &self,
        caller: &CallerIdentity,
        carrier_id: CarrierId,
    ) -> Result<Vec<Issue>, IssueError> {
        caller.user_id().ok_or(IssueError::Unauthenticated)?;
        if !caller.is_admin() && caller.as_carrier() != Some(carrier_id) {
            return Err(IssueError::forbidden("not allowed to read this carrier's issues"));
        }

        Ok(self.repository.find_by_carrier(carrier_id)?)
    }

    /// Issues attributed to a manager; admins or that manager
    pub fn list_by_manager(
        &self,
        caller: &CallerIdentity,
        manager_id: ManagerId,
    ) -> Result<Vec<Issue>, IssueError> {
        caller.user_id().ok_or(IssueError::Unauthenticated)?;
        if !caller.is_admin() && caller.as_manager() != Some(manager_id) {
            return Err(IssueError::forbidden("not allowed to read this manager's issues"));
        }

        Ok(self.repository.find_by_manager(manager_id)?)
    }

    /// Issues of one type, limited to those the caller may read
    pub fn list_by_type(
        &self,
        caller: &CallerIdentity,
        issue_type: IssueType,
    ) -> Result<Vec<Issue>, IssueError> {
        caller.user_id().ok_or(IssueError::Unauthenticated)?;

        Ok(self
            .repository
            .find_by_type(issue_type)?
            .into_iter()
            .filter(|issue| can_access(caller, issue))
            .collect())
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn find(&self, id: IssueId) -> Result<Issue, IssueError> {
        self.repository
            .find_by_id(id)?
            .ok_or(IssueError::NotFound { id })
    }

    fn announce(&self, event: &IssueEvent) {
        if let Err(e) = self.publisher.publish(event) {
            warn!(issue_id = %event.issue_id(), error = %e, "issue event not published");
        }
    }
}

/// Admins see everything, managers their own issues, carriers what they filed
fn can_access(caller: &CallerIdentity, issue: &Issue) -> bool {
    let Some(user_id) = caller.user_id() else {
        return false;
    };
    if caller.is_admin() {
        return true;
    }
    if caller.has_role(MANAGER) && ManagerId::from(user_id) == issue.manager_id() {
        return true;
    }
    caller.has_role(CARRIER) && CarrierId::from(user_id) == issue.carrier_id()
}

fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), IssueError> {
    if value.trim().is_empty() {
        return Err(IssueError::Validation(format!("{} cannot be blank", field)));
    }
    if value.chars().count() > max_len {
        return Err(IssueError::Validation(format!(
            "{} exceeds {} characters",
            field, max_len
        )));
    }
    Ok(())
}
