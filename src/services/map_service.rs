use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::database::models::{Map, MapChanges, MapDraft, MapWithZones};
use crate::database::store::{StoreTransaction, TransactionalStore};
use crate::types::MapId;

use super::{finish, ServiceError, ServiceResult};

/// Result of a successful map deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedMap {
    #[serde(rename = "deleted_map_id")]
    pub map_id: MapId,
}

/// Map lifecycle operations. Each call runs in its own transaction.
#[derive(Clone)]
pub struct MapService {
    store: Arc<dyn TransactionalStore>,
}

impl MapService {
    pub fn new(store: Arc<dyn TransactionalStore>) -> Self {
        Self { store }
    }

    pub async fn create_map(&self, draft: MapDraft) -> ServiceResult<Map> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.insert_map(&draft).await.map_err(ServiceError::from);
        let map = finish(tx, outcome).await?;
        info!("Created map {} for customer {}", map.map_id, map.customer_id);
        Ok(map)
    }

    /// The map and its zones, read in one transaction
    pub async fn get_map(&self, map_id: MapId) -> ServiceResult<MapWithZones> {
        let mut tx = self.store.begin().await?;
        let outcome = Self::load(&mut *tx, map_id).await;
        finish(tx, outcome).await
    }

    pub async fn update_map(&self, map_id: MapId, changes: MapChanges) -> ServiceResult<Map> {
        let mut tx = self.store.begin().await?;
        let outcome = match tx.update_map(map_id, &changes).await {
            Ok(Some(map)) => Ok(map),
            Ok(None) => Err(map_not_found(map_id)),
            Err(e) => Err(e.into()),
        };
        finish(tx, outcome).await
    }

    /// Hard-delete a map with its zones and customer links, all or nothing
    pub async fn delete_map(&self, map_id: MapId) -> ServiceResult<DeletedMap> {
        let mut tx = self.store.begin().await?;
        let outcome = Self::delete_cascade(&mut *tx, map_id).await;
        finish(tx, outcome).await
    }

    async fn load(tx: &mut dyn StoreTransaction, map_id: MapId) -> ServiceResult<MapWithZones> {
        let map = tx.find_map(map_id).await?.ok_or_else(|| map_not_found(map_id))?;
        let zones = tx.list_zones(map_id).await?;
        Ok(MapWithZones { map, zones })
    }

    // Dependents go first: zones and customer_map reference map without cascade
    async fn delete_cascade(tx: &mut dyn StoreTransaction, map_id: MapId) -> ServiceResult<DeletedMap> {
        let zones = tx.delete_zones_for_map(map_id).await?;
        let links = tx.delete_map_links(map_id).await?;

        match tx.delete_map(map_id).await? {
            Some(map_id) => {
                info!(
                    "Deleted map {} with {} zones and {} customer links",
                    map_id, zones, links
                );
                Ok(DeletedMap { map_id })
            }
            None => Err(map_not_found(map_id)),
        }
    }
}

fn map_not_found(map_id: MapId) -> ServiceError {
    ServiceError::NotFound(format!("Map {} not found", map_id))
}
