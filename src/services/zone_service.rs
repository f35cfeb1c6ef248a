use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::database::models::{Zone, ZoneInput};
use crate::database::record::{zone_inputs_from_json, RecordError, ZoneRecord};
use crate::database::store::{StoreTransaction, TransactionalStore};
use crate::types::{classify, generate_zone_id, MapId, ZoneIdentity};

use super::{finish, ServiceError, ServiceResult};

/// Zone operations, including bulk reconciliation of a map's zone set
#[derive(Clone)]
pub struct ZoneService {
    store: Arc<dyn TransactionalStore>,
}

impl ZoneService {
    pub fn new(store: Arc<dyn TransactionalStore>) -> Self {
        Self { store }
    }

    /// Parse a client batch and reconcile it against `map_id`
    pub async fn reconcile_json(&self, map_id: MapId, body: Value) -> ServiceResult<Vec<Zone>> {
        let inputs = zone_inputs_from_json(body, map_id)?;
        self.reconcile(map_id, inputs).await
    }

    /// Apply a batch of zone inputs in one transaction.
    ///
    /// Existing zones are updated in place and new ones inserted with fresh
    /// ids. The result follows submission order. An existing zone that
    /// matches no row of this map is skipped, not reported: the batch still
    /// commits and the caller sees a shorter result. Any storage error rolls
    /// back the whole batch.
    pub async fn reconcile(&self, map_id: MapId, inputs: Vec<ZoneInput>) -> ServiceResult<Vec<Zone>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.store.begin().await?;
        let outcome = Self::apply_batch(&mut *tx, map_id, &inputs).await;
        let saved = finish(tx, outcome).await?;

        info!(
            "Reconciled map {}: {} submitted, {} saved",
            map_id,
            inputs.len(),
            saved.len()
        );
        Ok(saved)
    }

    async fn apply_batch(
        tx: &mut dyn StoreTransaction,
        map_id: MapId,
        inputs: &[ZoneInput],
    ) -> ServiceResult<Vec<Zone>> {
        let mut saved = Vec::with_capacity(inputs.len());

        for input in inputs {
            match input {
                ZoneInput::Existing { id, patch } => {
                    match tx.update_zone(id, Some(map_id), patch).await? {
                        Some(zone) => saved.push(zone),
                        None => debug!("Skipping zone {}: no such zone in map {}", id, map_id),
                    }
                }
                ZoneInput::New(draft) => {
                    let id = generate_zone_id();
                    saved.push(tx.insert_zone(&id, map_id, draft).await?);
                }
            }
        }

        Ok(saved)
    }

    /// Zones of a map, oldest first. An unknown map has no zones.
    pub async fn list_zones(&self, map_id: MapId) -> ServiceResult<Vec<Zone>> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.list_zones(map_id).await.map_err(ServiceError::from);
        finish(tx, outcome).await
    }

    pub async fn get_zone(&self, id: &str) -> ServiceResult<Zone> {
        let mut tx = self.store.begin().await?;
        let outcome = match tx.find_zone(id).await {
            Ok(Some(zone)) => Ok(zone),
            Ok(None) => Err(zone_not_found(id)),
            Err(e) => Err(e.into()),
        };
        finish(tx, outcome).await
    }

    /// Insert a single zone. The record must classify as new.
    pub async fn create_zone(&self, record: ZoneRecord) -> ServiceResult<Zone> {
        if let ZoneIdentity::Existing(id) = record.identity() {
            return Err(ServiceError::InvalidInput(format!(
                "Zone {} is already saved; update it instead",
                id
            )));
        }
        let map_id = record
            .map_id
            .ok_or(RecordError::MissingRequiredField("map_id"))?;
        let draft = record.into_draft()?;

        let id = generate_zone_id();
        let mut tx = self.store.begin().await?;
        let outcome = tx.insert_zone(&id, map_id, &draft).await.map_err(ServiceError::from);
        let zone = finish(tx, outcome).await?;
        info!("Created zone {} in map {}", zone.id, map_id);
        Ok(zone)
    }

    /// Update a single saved zone; omitted fields keep their stored values
    pub async fn update_zone(&self, id: &str, record: ZoneRecord) -> ServiceResult<Zone> {
        if classify(Some(id)) == ZoneIdentity::New {
            return Err(ServiceError::InvalidInput(format!(
                "Zone {} has not been saved yet; create it instead",
                id
            )));
        }
        let map_id = record.map_id;
        let patch = record.into_patch()?;

        let mut tx = self.store.begin().await?;
        let outcome = match tx.update_zone(id, map_id, &patch).await {
            Ok(Some(zone)) => Ok(zone),
            Ok(None) => Err(zone_not_found(id)),
            Err(e) => Err(e.into()),
        };
        finish(tx, outcome).await
    }

    pub async fn delete_zone(&self, id: &str) -> ServiceResult<()> {
        let mut tx = self.store.begin().await?;
        let outcome = match tx.delete_zone(id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(zone_not_found(id)),
            Err(e) => Err(e.into()),
        };
        finish(tx, outcome).await?;
        info!("Deleted zone {}", id);
        Ok(())
    }
}

fn zone_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Zone {} not found", id))
}
