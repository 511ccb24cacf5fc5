//! In-Memory Repository Implementations
//!
//! Process-local state only; everything is rebuilt from the event stream
//! on restart.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use fleet_domain::{
    Assignment, CarrierId, Issue, IssueDraft, IssueId, IssueRepository, IssueType, ManagerId,
    RelationshipStore, RepositoryError, VehicleId,
};

#[derive(Debug, Default)]
struct RelationshipMaps {
    vehicle_manager: HashMap<VehicleId, ManagerId>,
    carrier_vehicle: HashMap<CarrierId, VehicleId>,
    carrier_manager_backfill: HashMap<CarrierId, ManagerId>,
    /// Reverse of `carrier_vehicle`, most recent assignment last
    vehicle_carriers: HashMap<VehicleId, Vec<CarrierId>>,
}

impl RelationshipMaps {
    fn vacate(&mut self, vehicle_id: VehicleId, carrier_id: CarrierId) {
        if let Some(carriers) = self.vehicle_carriers.get_mut(&vehicle_id) {
            carriers.retain(|c| *c != carrier_id);
            if carriers.is_empty() {
                self.vehicle_carriers.remove(&vehicle_id);
            }
        }
    }
}

/// In-memory Relationship Store
///
/// All four maps sit behind one lock so a reader never sees the forward
/// and reverse assignment maps disagree.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRelationshipStore {
    maps: Arc<RwLock<RelationshipMaps>>,
}

impl InMemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelationshipStore for InMemoryRelationshipStore {
    fn put_vehicle_manager(&self, vehicle_id: VehicleId, manager_id: ManagerId) {
        let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);
        maps.vehicle_manager.insert(vehicle_id, manager_id);
    }

    fn put_carrier_vehicle(&self, carrier_id: CarrierId, vehicle_id: VehicleId) -> Assignment {
        let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);

        let previous = maps.carrier_vehicle.insert(carrier_id, vehicle_id);
        if let Some(from) = previous.filter(|from| *from != vehicle_id) {
            maps.vacate(from, carrier_id);
        }

        let carriers = maps.vehicle_carriers.entry(vehicle_id).or_default();
        carriers.retain(|c| *c != carrier_id);
        let other = carriers.last().copied();
        carriers.push(carrier_id);

        match (other, previous) {
            (Some(with), _) => Assignment::Shared { with },
            (None, None) => Assignment::New,
            (None, Some(from)) if from == vehicle_id => Assignment::Unchanged,
            (None, Some(from)) => Assignment::Moved { from },
        }
    }

    fn remove_carrier_vehicle(&self, carrier_id: CarrierId) -> Option<VehicleId> {
        let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);

        let vehicle_id = maps.carrier_vehicle.remove(&carrier_id)?;
        maps.vacate(vehicle_id, carrier_id);
        Some(vehicle_id)
    }

    fn put_carrier_manager_backfill(&self, carrier_id: CarrierId, manager_id: ManagerId) {
        let mut maps = self.maps.write().unwrap_or_else(PoisonError::into_inner);
        maps.carrier_manager_backfill.insert(carrier_id, manager_id);
    }

    fn vehicle_manager(&self, vehicle_id: VehicleId) -> Option<ManagerId> {
        let maps = self.maps.read().unwrap_or_else(PoisonError::into_inner);
        maps.vehicle_manager.get(&vehicle_id).copied()
    }

    fn carrier_vehicle(&self, carrier_id: CarrierId) -> Option<VehicleId> {
        let maps = self.maps.read().unwrap_or_else(PoisonError::into_inner);
        maps.carrier_vehicle.get(&carrier_id).copied()
    }

    fn carrier_manager_backfill(&self, carrier_id: CarrierId) -> Option<ManagerId> {
        let maps = self.maps.read().unwrap_or_else(PoisonError::into_inner);
        maps.carrier_manager_backfill.get(&carrier_id).copied()
    }

    fn vehicle_carrier(&self, vehicle_id: VehicleId) -> Option<CarrierId> {
        let maps = self.maps.read().unwrap_or_else(PoisonError::into_inner);
        maps.vehicle_carriers
            .get(&vehicle_id)
            .and_then(|carriers| carriers.last().copied())
    }
}

#[derive(Debug, Default)]
struct IssueTable {
    rows: HashMap<IssueId, Issue>,
    last_id: i64,
}

/// In-memory Issue Repository
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueRepository {
    table: Arc<RwLock<IssueTable>>,
}

impl InMemoryIssueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, IssueTable>, RepositoryError> {
        self.table.read().map_err(|_| RepositoryError::PersistenceError {
            message: "Failed to acquire read lock".to_string(),
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, IssueTable>, RepositoryError> {
        self.table.write().map_err(|_| RepositoryError::PersistenceError {
            message: "Failed to acquire write lock".to_string(),
        })
    }

    fn select(&self, predicate: impl Fn(&Issue) -> bool) -> Result<Vec<Issue>, RepositoryError> {
        let table = self.read()?;
        let mut issues: Vec<Issue> = table
            .rows
            .values()
            .filter(|issue| predicate(issue))
            .cloned()
            .collect();
        issues.sort_by_key(|issue| issue.id());
        Ok(issues)
    }
}

impl IssueRepository for InMemoryIssueRepository {
    fn insert(&mut self, draft: IssueDraft) -> Result<Issue, RepositoryError> {
        let mut table = self.write()?;
        table.last_id += 1;

        let issue = Issue::from_draft(IssueId::new(table.last_id), draft);
        table.rows.insert(issue.id(), issue.clone());
        Ok(issue)
    }

    fn save(&mut self, issue: &Issue) -> Result<(), RepositoryError> {
        let mut table = self.write()?;
        match table.rows.get_mut(&issue.id()) {
            Some(row) => {
                *row = issue.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound { id: issue.id() }),
        }
    }

    fn find_by_id(&self, id: IssueId) -> Result<Option<Issue>, RepositoryError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    fn find_by_carrier(&self, carrier_id: CarrierId) -> Result<Vec<Issue>, RepositoryError> {
        self.select(|issue| issue.carrier_id() == carrier_id)
    }

    fn find_by_manager(&self, manager_id: ManagerId) -> Result<Vec<Issue>, RepositoryError> {
        self.select(|issue| issue.manager_id() == manager_id)
    }

    fn find_by_type(&self, issue_type: IssueType) -> Result<Vec<Issue>, RepositoryError> {
        self.select(|issue| issue.issue_type() == issue_type)
    }

    fn delete(&mut self, id: IssueId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.rows.remove(&id).is_some())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(id: i64) -> VehicleId {
        VehicleId::new(id)
    }

    fn c(id: i64) -> CarrierId {
        CarrierId::new(id)
    }

    #[test]
    fn test_assignment_kinds() {
        let store = InMemoryRelationshipStore::new();

        assert_eq!(store.put_carrier_vehicle(c(100), v(1)), Assignment::New);
        assert_eq!(store.put_carrier_vehicle(c(100), v(1)), Assignment::Unchanged);
        assert_eq!(
            store.put_carrier_vehicle(c(100), v(2)),
            Assignment::Moved { from: v(1) }
        );
        assert_eq!(
            store.put_carrier_vehicle(c(200), v(2)),
            Assignment::Shared { with: c(100) }
        );
    }

    #[test]
    fn test_move_vacates_old_vehicle() {
        let store = InMemoryRelationshipStore::new();
        store.put_carrier_vehicle(c(100), v(1));
        store.put_carrier_vehicle(c(100), v(2));

        assert_eq!(store.vehicle_carrier(v(1)), None);
        assert_eq!(store.vehicle_carrier(v(2)), Some(c(100)));
    }

    #[test]
    fn test_remove_keeps_newer_occupant() {
        let store = InMemoryRelationshipStore::new();
        store.put_carrier_vehicle(c(100), v(1));
        store.put_carrier_vehicle(c(200), v(1));

        assert_eq!(store.remove_carrier_vehicle(c(100)), Some(v(1)));
        assert_eq!(store.vehicle_carrier(v(1)), Some(c(200)));
        assert_eq!(store.carrier_vehicle(c(200)), Some(v(1)));
    }

    #[test]
    fn test_removing_newest_of_shared_vehicle_exposes_older() {
        let store = InMemoryRelationshipStore::new();
        store.put_carrier_vehicle(c(500), v(5));
        store.put_carrier_vehicle(c(501), v(5));

        assert_eq!(store.remove_carrier_vehicle(c(501)), Some(v(5)));
        assert_eq!(store.vehicle_carrier(v(5)), Some(c(500)));

        assert_eq!(store.remove_carrier_vehicle(c(500)), Some(v(5)));
        assert_eq!(store.vehicle_carrier(v(5)), None);
        assert!(!store.has_carrier_vehicle(c(500)));
    }

    #[test]
    fn test_shared_carrier_moving_away_leaves_other_in_place() {
        let store = InMemoryRelationshipStore::new();
        store.put_carrier_vehicle(c(500), v(5));
        store.put_carrier_vehicle(c(501), v(5));

        assert_eq!(
            store.put_carrier_vehicle(c(501), v(6)),
            Assignment::Moved { from: v(5) }
        );
        assert_eq!(store.vehicle_carrier(v(5)), Some(c(500)));
        assert_eq!(store.vehicle_carrier(v(6)), Some(c(501)));
    }

    #[test]
    fn test_remove_unknown_carrier() {
        let store = InMemoryRelationshipStore::new();
        assert_eq!(store.remove_carrier_vehicle(c(1)), None);
        assert!(!store.has_carrier_vehicle(c(1)));
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryRelationshipStore::new();
        let other = store.clone();
        other.put_vehicle_manager(v(1), ManagerId::new(10));
        other.put_carrier_manager_backfill(c(100), ManagerId::new(10));

        assert_eq!(store.vehicle_manager(v(1)), Some(ManagerId::new(10)));
        assert_eq!(store.carrier_manager_backfill(c(100)), Some(ManagerId::new(10)));
        assert!(!store.has_carrier_vehicle(c(100)));
    }

    fn draft(carrier: i64, manager: i64, issue_type: IssueType) -> IssueDraft {
        IssueDraft {
            title: "Flat tire".to_string(),
            content: "Rear left".to_string(),
            issue_type,
            reported_at: "2026-01-01T00:00:00+00:00".to_string(),
            carrier_id: c(carrier),
            manager_id: ManagerId::new(manager),
            vehicle_id: None,
            shipment_id: None,
        }
    }

    #[test]
    fn test_issue_repository_crud() {
        let mut repo = InMemoryIssueRepository::new();

        let first = repo.insert(draft(100, 10, IssueType::Route)).unwrap();
        let second = repo.insert(draft(101, 10, IssueType::Other)).unwrap();
        assert_eq!(first.id(), IssueId::new(1));
        assert_eq!(second.id(), IssueId::new(2));

        let mut changed = first.clone();
        changed.update_title("Two flat tires");
        repo.save(&changed).unwrap();
        assert_eq!(
            repo.find_by_id(first.id()).unwrap().unwrap().title(),
            "Two flat tires"
        );

        assert_eq!(repo.find_by_manager(ManagerId::new(10)).unwrap().len(), 2);
        assert_eq!(repo.find_by_carrier(c(101)).unwrap(), vec![second.clone()]);
        assert_eq!(repo.find_by_type(IssueType::Route).unwrap().len(), 1);

        assert!(repo.delete(first.id()).unwrap());
        assert!(!repo.delete(first.id()).unwrap());
        assert!(!repo.exists(first.id()).unwrap());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_save_unknown_issue_fails() {
        let mut repo = InMemoryIssueRepository::new();
        let ghost = Issue::from_draft(IssueId::new(9), draft(1, 1, IssueType::Other));

        assert_eq!(
            repo.save(&ghost),
            Err(RepositoryError::NotFound { id: IssueId::new(9) })
        );
    }
}
