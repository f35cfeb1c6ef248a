use std::sync::Arc;

use serde_json::json;

use crate::database::models::{Map, MapDraft, Zone, ZoneDraft};
use crate::database::store::TransactionalStore;
use crate::database::MemoryStore;
use crate::services::{MapService, ZoneService};
use crate::types::{generate_zone_id, MapId};

/// Services wired to a fresh in-memory store with one customer
pub struct TestContext {
    pub store: MemoryStore,
    pub maps: MapService,
    pub zones: ZoneService,
}

impl TestContext {
    pub const CUSTOMER_ID: i32 = 1;

    pub async fn new() -> Self {
        let store = MemoryStore::new();
        store.add_customer(Self::CUSTOMER_ID).await;

        let shared: Arc<dyn TransactionalStore> = Arc::new(store.clone());
        Self {
            maps: MapService::new(shared.clone()),
            zones: ZoneService::new(shared),
            store,
        }
    }

    pub fn map_draft() -> MapDraft {
        MapDraft {
            customer_id: Self::CUSTOMER_ID,
            title: "Test map".to_string(),
            description: "fixture".to_string(),
            country: Some("NL".to_string()),
            active: true,
            map_code: None,
            map_data: MapDraft::default_map_data(),
            map_bounds: MapDraft::default_map_bounds(),
        }
    }

    pub fn zone_draft(name: &str) -> ZoneDraft {
        ZoneDraft {
            name: name.to_string(),
            color: "#3388ff".to_string(),
            coordinates: json!([{"lat": 52.37, "lng": 4.89}, {"lat": 52.38, "lng": 4.90}]),
            customer_id: None,
        }
    }

    pub async fn create_map(&self) -> Map {
        self.maps
            .create_map(Self::map_draft())
            .await
            .expect("create fixture map")
    }

    pub async fn create_zone(&self, map_id: MapId, name: &str) -> Zone {
        self.create_zone_with_id(map_id, &generate_zone_id(), name).await
    }

    /// Insert a zone under a caller-chosen id, bypassing id generation
    pub async fn create_zone_with_id(&self, map_id: MapId, id: &str, name: &str) -> Zone {
        let mut tx = self.store.begin().await.expect("begin");
        let zone = tx
            .insert_zone(&id.to_string(), map_id, &Self::zone_draft(name))
            .await
            .expect("insert fixture zone");
        tx.commit().await.expect("commit");
        zone
    }
}
