use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Map, MapChanges, MapDraft, Zone, ZoneDraft, ZonePatch};
use crate::types::{MapId, ZoneId};

/// Errors raised by the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Statement failed: {0}")]
    Statement(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Source of transactions. Implemented by the Postgres pool and the in-memory store.
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;

    /// Cheap connectivity check used by `/health`
    async fn ping(&self) -> Result<(), StoreError>;
}

/// One open transaction. Statements see each other's effects; nothing is
/// visible outside until `commit`. Dropping the handle without committing
/// rolls back.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn insert_map(&mut self, draft: &MapDraft) -> Result<Map, StoreError>;

    async fn find_map(&mut self, map_id: MapId) -> Result<Option<Map>, StoreError>;

    async fn update_map(
        &mut self,
        map_id: MapId,
        changes: &MapChanges,
    ) -> Result<Option<Map>, StoreError>;

    /// Returns the id of the removed row, or `None` if nothing matched
    async fn delete_map(&mut self, map_id: MapId) -> Result<Option<MapId>, StoreError>;

    /// Removes every zone owned by the map, returning the row count
    async fn delete_zones_for_map(&mut self, map_id: MapId) -> Result<u64, StoreError>;

    /// Removes every customer_map association for the map, returning the row count
    async fn delete_map_links(&mut self, map_id: MapId) -> Result<u64, StoreError>;

    /// Zones of a map, oldest first
    async fn list_zones(&mut self, map_id: MapId) -> Result<Vec<Zone>, StoreError>;

    async fn find_zone(&mut self, id: &str) -> Result<Option<Zone>, StoreError>;

    async fn insert_zone(
        &mut self,
        id: &ZoneId,
        map_id: MapId,
        draft: &ZoneDraft,
    ) -> Result<Zone, StoreError>;

    /// Updates the zone with `id`, restricted to `map_id` when given.
    /// `Ok(None)` means no row matched, which is not an error.
    async fn update_zone(
        &mut self,
        id: &str,
        map_id: Option<MapId>,
        patch: &ZonePatch,
    ) -> Result<Option<Zone>, StoreError>;

    async fn delete_zone(&mut self, id: &str) -> Result<Option<ZoneId>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
