use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::database::models::{Map, MapChanges, MapDraft, Zone, ZoneDraft, ZonePatch};
use crate::database::store::{StoreError, StoreTransaction, TransactionalStore};
use crate::types::{CustomerId, MapId, ZoneId};

#[derive(Debug, Clone)]
struct MemoryState {
    customers: BTreeSet<CustomerId>,
    maps: BTreeMap<MapId, Map>,
    /// Insertion order doubles as the tie-breaker for equal timestamps
    zones: Vec<Zone>,
    links: BTreeSet<(CustomerId, MapId)>,
    next_map_id: MapId,
    fail_statement: Option<usize>,
    offline: bool,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            customers: BTreeSet::new(),
            maps: BTreeMap::new(),
            zones: Vec::new(),
            links: BTreeSet::new(),
            next_map_id: 1,
            fail_statement: None,
            offline: false,
        }
    }
}

/// In-process store with the same foreign keys as `sql/schema.sql`.
///
/// A transaction holds the store lock until it commits or is dropped, so
/// transactions are serialized. Writes go to a working copy that replaces
/// the shared state only on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a customer so maps and zones can reference it
    pub async fn add_customer(&self, customer_id: CustomerId) {
        self.state.lock().await.customers.insert(customer_id);
    }

    /// Share a map with a customer (a customer_map row)
    pub async fn link_customer(&self, customer_id: CustomerId, map_id: MapId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.customers.contains(&customer_id) {
            return Err(StoreError::Constraint("customer_map_customer_id_fkey".to_string()));
        }
        if !state.maps.contains_key(&map_id) {
            return Err(StoreError::Constraint("customer_map_map_id_fkey".to_string()));
        }
        state.links.insert((customer_id, map_id));
        Ok(())
    }

    /// Make the `n`-th statement (1-based) of the next transaction fail
    #[cfg(any(test, feature = "test-support"))]
    pub async fn fail_statement(&self, n: usize) {
        self.state.lock().await.fail_statement = Some(n);
    }

    /// Refuse new transactions and pings, as a lost database would
    #[cfg(any(test, feature = "test-support"))]
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    pub async fn map(&self, map_id: MapId) -> Option<Map> {
        self.state.lock().await.maps.get(&map_id).cloned()
    }

    pub async fn zones(&self, map_id: MapId) -> Vec<Zone> {
        let state = self.state.lock().await;
        zones_of(&state, map_id)
    }

    pub async fn zone_count(&self) -> usize {
        self.state.lock().await.zones.len()
    }

    pub async fn link_count(&self, map_id: MapId) -> usize {
        let state = self.state.lock().await;
        state.links.iter().filter(|(_, m)| *m == map_id).count()
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let mut guard = self.state.clone().lock_owned().await;
        if guard.offline {
            return Err(unavailable());
        }
        let fail_at = guard.fail_statement.take();
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            executed: 0,
            fail_at,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.state.lock().await.offline {
            return Err(unavailable());
        }
        Ok(())
    }
}

fn unavailable() -> StoreError {
    StoreError::Statement("store is offline".to_string())
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    executed: usize,
    fail_at: Option<usize>,
}

impl MemoryTransaction {
    /// Count a statement and trip the injected failure if it is due
    fn statement(&mut self) -> Result<(), StoreError> {
        self.executed += 1;
        if self.fail_at == Some(self.executed) {
            return Err(StoreError::Statement(format!(
                "injected failure at statement {}",
                self.executed
            )));
        }
        Ok(())
    }
}

fn zones_of(state: &MemoryState, map_id: MapId) -> Vec<Zone> {
    let mut zones: Vec<Zone> = state
        .zones
        .iter()
        .filter(|z| z.map_id == map_id)
        .cloned()
        .collect();
    zones.sort_by_key(|z| z.created_at);
    zones
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert_map(&mut self, draft: &MapDraft) -> Result<Map, StoreError> {
        self.statement()?;
        if !self.working.customers.contains(&draft.customer_id) {
            return Err(StoreError::Constraint("map_customer_id_fkey".to_string()));
        }

        let map_id = self.working.next_map_id;
        self.working.next_map_id += 1;
        let map = Map {
            map_id,
            customer_id: draft.customer_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            country: draft.country.clone(),
            active: draft.active,
            map_code: draft.map_code.clone(),
            map_data: draft.map_data.clone(),
            map_bounds: draft.map_bounds.clone(),
            created_at: Utc::now(),
        };
        self.working.maps.insert(map_id, map.clone());
        Ok(map)
    }

    async fn find_map(&mut self, map_id: MapId) -> Result<Option<Map>, StoreError> {
        self.statement()?;
        Ok(self.working.maps.get(&map_id).cloned())
    }

    async fn update_map(
        &mut self,
        map_id: MapId,
        changes: &MapChanges,
    ) -> Result<Option<Map>, StoreError> {
        self.statement()?;
        Ok(self.working.maps.get_mut(&map_id).map(|map| {
            changes.apply_to(map);
            map.clone()
        }))
    }

    async fn delete_map(&mut self, map_id: MapId) -> Result<Option<MapId>, StoreError> {
        self.statement()?;
        if self.working.zones.iter().any(|z| z.map_id == map_id) {
            return Err(StoreError::Constraint("zones_map_id_fkey".to_string()));
        }
        if self.working.links.iter().any(|(_, m)| *m == map_id) {
            return Err(StoreError::Constraint("customer_map_map_id_fkey".to_string()));
        }
        Ok(self.working.maps.remove(&map_id).map(|map| map.map_id))
    }

    async fn delete_zones_for_map(&mut self, map_id: MapId) -> Result<u64, StoreError> {
        self.statement()?;
        let before = self.working.zones.len();
        self.working.zones.retain(|z| z.map_id != map_id);
        Ok((before - self.working.zones.len()) as u64)
    }

    async fn delete_map_links(&mut self, map_id: MapId) -> Result<u64, StoreError> {
        self.statement()?;
        let before = self.working.links.len();
        self.working.links.retain(|(_, m)| *m != map_id);
        Ok((before - self.working.links.len()) as u64)
    }

    async fn list_zones(&mut self, map_id: MapId) -> Result<Vec<Zone>, StoreError> {
        self.statement()?;
        Ok(zones_of(&self.working, map_id))
    }

    async fn find_zone(&mut self, id: &str) -> Result<Option<Zone>, StoreError> {
        self.statement()?;
        Ok(self.working.zones.iter().find(|z| z.id == id).cloned())
    }

    async fn insert_zone(
        &mut self,
        id: &ZoneId,
        map_id: MapId,
        draft: &ZoneDraft,
    ) -> Result<Zone, StoreError> {
        self.statement()?;
        if !self.working.maps.contains_key(&map_id) {
            return Err(StoreError::Constraint("zones_map_id_fkey".to_string()));
        }
        if let Some(customer_id) = draft.customer_id {
            if !self.working.customers.contains(&customer_id) {
                return Err(StoreError::Constraint("zones_customer_id_fkey".to_string()));
            }
        }
        if self.working.zones.iter().any(|z| &z.id == id) {
            return Err(StoreError::Constraint("zones_pkey".to_string()));
        }

        let now = Utc::now();
        let zone = Zone {
            id: id.clone(),
            map_id,
            name: draft.name.clone(),
            color: draft.color.clone(),
            coordinates: draft.coordinates.clone(),
            customer_id: draft.customer_id,
            created_at: now,
            updated_at: now,
        };
        self.working.zones.push(zone.clone());
        Ok(zone)
    }

    async fn update_zone(
        &mut self,
        id: &str,
        map_id: Option<MapId>,
        patch: &ZonePatch,
    ) -> Result<Option<Zone>, StoreError> {
        self.statement()?;
        let zone = self
            .working
            .zones
            .iter_mut()
            .find(|z| z.id == id && map_id.map_or(true, |m| z.map_id == m));
        Ok(zone.map(|zone| {
            patch.apply_to(zone);
            zone.updated_at = Utc::now();
            zone.clone()
        }))
    }

    async fn delete_zone(&mut self, id: &str) -> Result<Option<ZoneId>, StoreError> {
        self.statement()?;
        let position = self.working.zones.iter().position(|z| z.id == id);
        Ok(position.map(|index| self.working.zones.remove(index).id))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
