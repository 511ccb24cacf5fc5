//! IssueController - JSON request handling for the issues endpoints
//!
//! | Operation | Route |
//! |-----------|-------|
//! | create | `POST /api/v1/issues` |
//! | get | `GET /api/v1/issues/{id}` |
//! | mine | `GET /api/v1/issues/carrier/issues` |
//! | by carrier | `GET /api/v1/issues/carrier/{carrierId}` |
//! | by manager | `GET /api/v1/issues/manager/{managerId}` |
//! | by type | `GET /api/v1/issues/type/{type}` |
//! | update | `PUT /api/v1/issues/{id}` |
//! | delete | `DELETE /api/v1/issues/{id}` |
//!
//! Routing itself belongs to whatever HTTP server embeds this; the
//! controller only turns headers and bodies into use case calls.
//! List routes answer 204 with no body when nothing matches.

use chrono::Utc;
use fleet_domain::{
    CarrierId, Issue, IssueId, IssueRepository, IssueType, ManagerId, ShipmentId,
};
use fleet_usecase::{
    CallerIdentity, CreateIssueRequest, IssueError, IssueEventPublisher, IssueService,
    UpdateIssueRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{USER_ID_HEADER, USER_ROLES_HEADER};

/// Request headers, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a header
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The caller the gateway vouched for
    pub fn caller(&self) -> CallerIdentity {
        CallerIdentity::from_headers(self.get(USER_ID_HEADER), self.get(USER_ROLES_HEADER))
    }
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn created(body: Value) -> Self {
        Self { status: 201, body }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: Value::Null,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({
                "status": status,
                "error": message.into(),
                "timestamp": Utc::now().to_rfc3339(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<IssueError> for Response {
    fn from(err: IssueError) -> Self {
        Response::error(err.status(), err.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIssueBody {
    title: String,
    content: String,
    #[serde(rename = "type")]
    issue_type: String,
    #[serde(default)]
    shipment_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateIssueBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, rename = "type")]
    issue_type: Option<String>,
}

/// Outbound representation of an issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub reported_at: String,
    pub carrier_id: i64,
    pub manager_id: i64,
    pub vehicle_id: Option<i64>,
    pub shipment_id: Option<i64>,
}

impl From<&Issue> for IssueDto {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id().get(),
            title: issue.title().to_string(),
            content: issue.content().to_string(),
            issue_type: issue.issue_type().as_str().to_string(),
            reported_at: issue.reported_at().to_string(),
            carrier_id: issue.carrier_id().get(),
            manager_id: issue.manager_id().get(),
            vehicle_id: issue.vehicle_id().map(|id| id.get()),
            shipment_id: issue.shipment_id().map(|id| id.get()),
        }
    }
}

fn parse_type(raw: &str) -> Result<IssueType, Response> {
    IssueType::parse(raw).ok_or_else(|| {
        Response::error(400, format!("Unknown issue type: {}", raw))
    })
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, Response> {
    serde_json::from_str(body).map_err(|e| Response::error(400, format!("Invalid request body: {}", e)))
}

fn one(issue: &Issue) -> Value {
    serde_json::to_value(IssueDto::from(issue)).unwrap_or(Value::Null)
}

fn many(issues: &[Issue]) -> Response {
    if issues.is_empty() {
        return Response::no_content();
    }
    Response::ok(Value::Array(issues.iter().map(one).collect()))
}

/// IssueController
pub struct IssueController<R, P> {
    service: IssueService<R, P>,
}

impl<R, P> IssueController<R, P>
where
    R: IssueRepository,
    P: IssueEventPublisher,
{
    pub fn new(service: IssueService<R, P>) -> Self {
        Self { service }
    }

    pub fn create(&mut self, headers: &Headers, body: &str) -> Response {
        let caller = headers.caller();
        if let Err(e) = self.service.authorize_create(&caller) {
            return e.into();
        }

        let request = match parse_body::<CreateIssueBody>(body).and_then(|body| {
            let issue_type = parse_type(&body.issue_type)?;
            Ok(CreateIssueRequest {
                title: body.title,
                content: body.content,
                issue_type,
                shipment_id: body.shipment_id.map(ShipmentId::new),
            })
        }) {
            Ok(request) => request,
            Err(response) => return response,
        };

        match self.service.create(&caller, request) {
            Ok(issue) => Response::created(one(&issue)),
            Err(e) => e.into(),
        }
    }

    pub fn get(&self, headers: &Headers, id: i64) -> Response {
        match self.service.get(&headers.caller(), IssueId::new(id)) {
            Ok(issue) => Response::ok(one(&issue)),
            Err(e) => e.into(),
        }
    }

    pub fn my_issues(&self, headers: &Headers) -> Response {
        match self.service.list_for_caller_carrier(&headers.caller()) {
            Ok(issues) => many(&issues),
            Err(e) => e.into(),
        }
    }

    pub fn by_carrier(&self, headers: &Headers, carrier_id: i64) -> Response {
        match self
            .service
            .list_by_carrier(&headers.caller(), CarrierId::new(carrier_id))
        {
            Ok(issues) => many(&issues),
            Err(e) => e.into(),
        }
    }

    pub fn by_manager(&self, headers: &Headers, manager_id: i64) -> Response {
        match self
            .service
            .list_by_manager(&headers.caller(), ManagerId::new(manager_id))
        {
            Ok(issues) => many(&issues),
            Err(e) => e.into(),
        }
    }

    pub fn by_type(&self, headers: &Headers, issue_type: &str) -> Response {
        let issue_type = match parse_type(issue_type) {
            Ok(issue_type) => issue_type,
            Err(response) => return response,
        };

        match self.service.list_by_type(&headers.caller(), issue_type) {
            Ok(issues) => many(&issues),
            Err(e) => e.into(),
        }
    }

    pub fn update(&mut self, headers: &Headers, id: i64, body: &str) -> Response {
        let request = match parse_body::<UpdateIssueBody>(body).and_then(|body| {
            let issue_type = body.issue_type.as_deref().map(parse_type).transpose()?;
            Ok(UpdateIssueRequest {
                title: body.title,
                content: body.content,
                issue_type,
            })
        }) {
            Ok(request) => request,
            Err(response) => return response,
        };

        match self
            .service
            .update(&headers.caller(), IssueId::new(id), request)
        {
            Ok(issue) => Response::ok(one(&issue)),
            Err(e) => e.into(),
        }
    }

    pub fn delete(&mut self, headers: &Headers, id: i64) -> Response {
        match self.service.delete(&headers.caller(), IssueId::new(id)) {
            Ok(()) => Response::no_content(),
            Err(e) => e.into(),
        }
    }

    pub fn service(&self) -> &IssueService<R, P> {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{EventConsumer, OutboxPublisher};
    use crate::repository::{InMemoryIssueRepository, InMemoryRelationshipStore};
    use fleet_domain::RelationshipIndex;
    use std::sync::Arc;

    fn create_controller() -> (IssueController<InMemoryIssueRepository, OutboxPublisher>, OutboxPublisher) {
        let index = Arc::new(RelationshipIndex::new(Arc::new(InMemoryRelationshipStore::new())));
        let consumer = EventConsumer::new(index.clone());
        consumer.consume(r#"{"type":"vehicleCreatedEvent","payload":{"vehicleId":1,"managerId":10,"status":"ACTIVE"}}"#);
        consumer.consume(r#"{"type":"vehicleUpdatedEvent","payload":{"vehicleId":1,"carrierId":100}}"#);

        let outbox = OutboxPublisher::new();
        let service = IssueService::new(index, InMemoryIssueRepository::new(), outbox.clone());
        (IssueController::new(service), outbox)
    }

    fn carrier() -> Headers {
        Headers::new()
            .with("x-user-id", "100")
            .with("X-User-Roles", "ROLE_CARRIER")
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let headers = carrier();
        assert_eq!(headers.get("X-USER-ID"), Some("100"));
        assert_eq!(headers.caller().as_carrier(), Some(CarrierId::new(100)));
    }

    #[test]
    fn test_create_returns_created_issue() {
        let (mut controller, outbox) = create_controller();

        let response = controller.create(
            &carrier(),
            r#"{"title":"Brakes","content":"Squealing","type":"vehicle","shipmentId":7}"#,
        );

        assert_eq!(response.status, 201);
        let dto: IssueDto = serde_json::from_value(response.body).unwrap();
        assert_eq!(dto.manager_id, 10);
        assert_eq!(dto.vehicle_id, Some(1));
        assert_eq!(dto.shipment_id, Some(7));
        assert_eq!(dto.issue_type, "VEHICLE");
        assert_eq!(outbox.drain().len(), 1);
    }

    #[test]
    fn test_create_error_statuses() {
        let (mut controller, _) = create_controller();
        let body = r#"{"title":"Brakes","content":"Squealing","type":"OTHER"}"#;

        assert_eq!(controller.create(&Headers::new(), body).status, 401);
        assert_eq!(
            controller
                .create(&Headers::new().with("X-User-Id", "10").with("X-User-Roles", "MANAGER"), body)
                .status,
            403
        );

        let unknown = controller.create(
            &Headers::new().with("X-User-Id", "999").with("X-User-Roles", "CARRIER"),
            body,
        );
        assert_eq!(unknown.status, 400);
        assert!(unknown.body["error"].as_str().unwrap().contains("Manager unresolved"));

        assert_eq!(controller.create(&carrier(), "{").status, 400);
    }

    #[test]
    fn test_create_checks_caller_before_body() {
        let (mut controller, outbox) = create_controller();
        let manager = Headers::new().with("X-User-Id", "10").with("X-User-Roles", "ROLE_MANAGER");

        assert_eq!(controller.create(&Headers::new(), "{").status, 401);
        assert_eq!(
            controller
                .create(&Headers::new(), r#"{"title":"a","content":"b","type":"WEATHER"}"#)
                .status,
            401
        );
        assert_eq!(controller.create(&manager, "{").status, 403);
        assert_eq!(
            controller
                .create(&manager, r#"{"title":"a","content":"b","type":"WEATHER"}"#)
                .status,
            403
        );
        assert!(outbox.drain().is_empty());
        assert_eq!(
            controller
                .create(&carrier(), r#"{"title":"a","content":"b","type":"WEATHER"}"#)
                .status,
            400
        );
    }

    #[test]
    fn test_update_get_delete() {
        let (mut controller, _) = create_controller();
        let created = controller.create(
            &carrier(),
            r#"{"title":"Late","content":"Traffic","type":"ROUTE"}"#,
        );
        let id = created.body["id"].as_i64().unwrap();

        let updated = controller.update(&carrier(), id, r#"{"type":"shipment"}"#);
        assert_eq!(updated.status, 200);
        assert_eq!(updated.body["type"], "SHIPMENT");
        assert_eq!(updated.body["title"], "Late");

        let manager = Headers::new().with("X-User-Id", "10").with("X-User-Roles", "ROLE_MANAGER");
        assert_eq!(controller.get(&manager, id).status, 200);
        assert_eq!(controller.by_manager(&manager, 10).body.as_array().unwrap().len(), 1);
        assert_eq!(controller.by_type(&manager, "SHIPMENT").body.as_array().unwrap().len(), 1);
        assert_eq!(controller.by_type(&manager, "nope").status, 400);
        assert_eq!(controller.my_issues(&manager).status, 403);

        assert_eq!(controller.delete(&manager, id).status, 403);
        assert_eq!(controller.delete(&carrier(), id).status, 204);
        assert_eq!(controller.get(&carrier(), id).status, 404);
    }

    #[test]
    fn test_empty_lists_are_no_content() {
        let (mut controller, _) = create_controller();
        let manager = Headers::new().with("X-User-Id", "10").with("X-User-Roles", "ROLE_MANAGER");

        let mine = controller.my_issues(&carrier());
        assert_eq!(mine.status, 204);
        assert!(mine.body.is_null());
        assert_eq!(controller.by_carrier(&carrier(), 100).status, 204);
        assert_eq!(controller.by_manager(&manager, 10).status, 204);
        assert_eq!(controller.by_type(&manager, "ROUTE").status, 204);

        controller.create(&carrier(), r#"{"title":"Late","content":"Traffic","type":"ROUTE"}"#);

        let mine = controller.my_issues(&carrier());
        assert_eq!(mine.status, 200);
        assert_eq!(mine.body.as_array().unwrap().len(), 1);
        assert_eq!(controller.by_type(&manager, "ROUTE").status, 200);
        assert_eq!(controller.by_type(&manager, "VEHICLE").status, 204);
    }
}
