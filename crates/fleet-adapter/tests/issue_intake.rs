//! End-to-end: events in, issues out

use std::sync::Arc;
use std::thread;

use fleet_adapter::controller::{Headers, IssueController, IssueDto};
use fleet_adapter::messaging::{encode, EventConsumer, OutboxPublisher};
use fleet_adapter::repository::{InMemoryIssueRepository, InMemoryRelationshipStore};
use fleet_domain::{
    CarrierId, DomainEvent, ManagerId, RelationshipIndex, VehicleCreated, VehicleId,
    VehicleStatus, VehicleUpdated,
};
use fleet_usecase::IssueService;

fn vehicle_created(vehicle: i64, manager: i64) -> String {
    encode(&DomainEvent::VehicleCreated(VehicleCreated {
        vehicle_id: VehicleId::new(vehicle),
        manager_id: ManagerId::new(manager),
        license_plate: format!("PLATE-{}", vehicle),
        brand: "Volvo".to_string(),
        model: "FH16".to_string(),
        status: VehicleStatus::Active,
    }))
    .unwrap()
}

fn vehicle_assigned(vehicle: i64, carrier: Option<i64>) -> String {
    encode(&DomainEvent::VehicleUpdated(VehicleUpdated::assignment(
        VehicleId::new(vehicle),
        carrier.map(CarrierId::new),
    )))
    .unwrap()
}

fn carrier_headers(id: i64) -> Headers {
    Headers::new()
        .with("X-User-Id", id.to_string())
        .with("X-User-Roles", "ROLE_CARRIER")
}

#[test]
fn test_carrier_issue_is_attributed_to_vehicle_owner() {
    let index = Arc::new(RelationshipIndex::new(Arc::new(InMemoryRelationshipStore::new())));
    let consumer = EventConsumer::new(index.clone());

    consumer.consume(&vehicle_created(1, 10));
    consumer.consume(&vehicle_assigned(1, Some(100)));

    let outbox = OutboxPublisher::new();
    let mut controller = IssueController::new(IssueService::new(
        index.clone(),
        InMemoryIssueRepository::new(),
        outbox.clone(),
    ));

    let response = controller.create(
        &carrier_headers(100),
        r#"{"title":"Engine light","content":"Engine light is on","type":"VEHICLE"}"#,
    );
    assert_eq!(response.status, 201);

    let issue: IssueDto = serde_json::from_value(response.body).unwrap();
    assert_eq!(issue.carrier_id, 100);
    assert_eq!(issue.manager_id, 10);
    assert_eq!(issue.vehicle_id, Some(1));

    let published = outbox.drain();
    assert_eq!(published.len(), 1);
    assert!(published[0].contains(r#""managerId":10"#));

    let rejected = controller.create(
        &carrier_headers(999),
        r#"{"title":"Engine light","content":"Engine light is on","type":"OTHER"}"#,
    );
    assert_eq!(rejected.status, 400);
    assert!(rejected.body["error"]
        .as_str()
        .unwrap()
        .contains("Manager unresolved"));
    assert!(outbox.drain().is_empty());
}

#[test]
fn test_unassigned_carrier_keeps_filing_non_vehicle_issues() {
    let index = Arc::new(RelationshipIndex::new(Arc::new(InMemoryRelationshipStore::new())));
    let consumer = EventConsumer::new(index.clone());

    consumer.consume(&vehicle_created(1, 10));
    consumer.consume(&vehicle_assigned(1, Some(100)));
    consumer.consume(&vehicle_assigned(1, None));

    let mut controller = IssueController::new(IssueService::new(
        index,
        InMemoryIssueRepository::new(),
        OutboxPublisher::new(),
    ));

    let route = controller.create(
        &carrier_headers(100),
        r#"{"title":"Detour","content":"Bridge closed","type":"ROUTE"}"#,
    );
    assert_eq!(route.status, 201);
    assert_eq!(route.body["managerId"], 10);
    assert!(route.body["vehicleId"].is_null());

    let vehicle = controller.create(
        &carrier_headers(100),
        r#"{"title":"Oil","content":"Leak","type":"VEHICLE"}"#,
    );
    assert_eq!(vehicle.status, 400);
}

#[test]
fn test_concurrent_consumers_and_readers() {
    let index = Arc::new(RelationshipIndex::new(Arc::new(InMemoryRelationshipStore::new())));
    let consumer = EventConsumer::new(index.clone());

    // Carrier 1000 + n drives vehicle n, owned by manager 10 * n
    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let consumer = consumer.clone();
            thread::spawn(move || {
                for n in (worker * 25 + 1)..=(worker * 25 + 25) {
                    consumer.consume(&vehicle_created(n, 10 * n));
                    consumer.consume(&vehicle_assigned(n, Some(1000 + n)));
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let index = index.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    for n in 1..=100 {
                        let carrier = CarrierId::new(1000 + n);
                        if let Some(manager) = index.manager_for_carrier(carrier) {
                            assert_eq!(manager, ManagerId::new(10 * n));
                        }
                        if let Some(vehicle) = index.vehicle_for_carrier(carrier) {
                            assert_eq!(vehicle, VehicleId::new(n));
                        }
                    }
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    for n in 1..=100 {
        assert_eq!(
            index.manager_for_carrier(CarrierId::new(1000 + n)),
            Some(ManagerId::new(10 * n))
        );
    }

    let stats = index.stats();
    assert_eq!(stats.events_applied, 200);
    assert_eq!(stats.invariant_violations, 0);
    assert_eq!(stats.events_dropped, 0);
}
