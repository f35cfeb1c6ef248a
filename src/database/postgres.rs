use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::database::models::{Map, MapChanges, MapDraft, Zone, ZoneDraft, ZonePatch};
use crate::database::store::{StoreError, StoreTransaction, TransactionalStore};
use crate::types::{MapId, ZoneId};

const MAP_COLUMNS: &str = "map_id, customer_id, title, description, country, active, \
                           map_code, map_data, map_bounds, created_at";

const ZONE_COLUMNS: &str = "id, map_id, name, color, coordinates, customer_id, created_at, updated_at";

/// Postgres-backed store over a shared pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TransactionalStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Wraps a sqlx transaction, which rolls back on drop unless committed
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn insert_map(&mut self, draft: &MapDraft) -> Result<Map, StoreError> {
        let sql = format!(
            "INSERT INTO map (customer_id, title, description, country, active, map_code, map_data, map_bounds, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) RETURNING {}",
            MAP_COLUMNS
        );
        let map = sqlx::query_as::<_, Map>(&sql)
            .bind(draft.customer_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.country)
            .bind(draft.active)
            .bind(&draft.map_code)
            .bind(&draft.map_data)
            .bind(&draft.map_bounds)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(map)
    }

    async fn find_map(&mut self, map_id: MapId) -> Result<Option<Map>, StoreError> {
        let sql = format!("SELECT {} FROM map WHERE map_id = $1", MAP_COLUMNS);
        let map = sqlx::query_as::<_, Map>(&sql)
            .bind(map_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(map)
    }

    async fn update_map(
        &mut self,
        map_id: MapId,
        changes: &MapChanges,
    ) -> Result<Option<Map>, StoreError> {
        let sql = format!(
            "UPDATE map \
             SET title = COALESCE($1, title), \
                 description = COALESCE($2, description), \
                 country = COALESCE($3, country), \
                 active = COALESCE($4, active), \
                 map_data = COALESCE($5, map_data), \
                 map_bounds = COALESCE($6, map_bounds) \
             WHERE map_id = $7 RETURNING {}",
            MAP_COLUMNS
        );
        let map = sqlx::query_as::<_, Map>(&sql)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.country)
            .bind(changes.active)
            .bind(&changes.map_data)
            .bind(&changes.map_bounds)
            .bind(map_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(map)
    }

    async fn delete_map(&mut self, map_id: MapId) -> Result<Option<MapId>, StoreError> {
        let deleted: Option<(MapId,)> =
            sqlx::query_as("DELETE FROM map WHERE map_id = $1 RETURNING map_id")
                .bind(map_id)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(classify_sqlx_error)?;
        Ok(deleted.map(|(id,)| id))
    }

    async fn delete_zones_for_map(&mut self, map_id: MapId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM zones WHERE map_id = $1")
            .bind(map_id)
            .execute(&mut *self.tx)
            .await?;
        debug!("Deleted {} zones of map {}", result.rows_affected(), map_id);
        Ok(result.rows_affected())
    }

    async fn delete_map_links(&mut self, map_id: MapId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM customer_map WHERE map_id = $1")
            .bind(map_id)
            .execute(&mut *self.tx)
            .await?;
        debug!("Deleted {} customer links of map {}", result.rows_affected(), map_id);
        Ok(result.rows_affected())
    }

    async fn list_zones(&mut self, map_id: MapId) -> Result<Vec<Zone>, StoreError> {
        let sql = format!(
            "SELECT {} FROM zones WHERE map_id = $1 ORDER BY created_at ASC, seq ASC",
            ZONE_COLUMNS
        );
        let zones = sqlx::query_as::<_, Zone>(&sql)
            .bind(map_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(zones)
    }

    async fn find_zone(&mut self, id: &str) -> Result<Option<Zone>, StoreError> {
        let sql = format!("SELECT {} FROM zones WHERE id = $1", ZONE_COLUMNS);
        let zone = sqlx::query_as::<_, Zone>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(zone)
    }

    async fn insert_zone(
        &mut self,
        id: &ZoneId,
        map_id: MapId,
        draft: &ZoneDraft,
    ) -> Result<Zone, StoreError> {
        let sql = format!(
            "INSERT INTO zones (id, map_id, name, color, coordinates, customer_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING {}",
            ZONE_COLUMNS
        );
        let zone = sqlx::query_as::<_, Zone>(&sql)
            .bind(id)
            .bind(map_id)
            .bind(&draft.name)
            .bind(&draft.color)
            .bind(&draft.coordinates)
            .bind(draft.customer_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(classify_sqlx_error)?;
        debug!("Inserted zone {} into map {}", zone.id, map_id);
        Ok(zone)
    }

    async fn update_zone(
        &mut self,
        id: &str,
        map_id: Option<MapId>,
        patch: &ZonePatch,
    ) -> Result<Option<Zone>, StoreError> {
        let sql = format!(
            "UPDATE zones \
             SET name = COALESCE($1, name), \
                 color = COALESCE($2, color), \
                 coordinates = COALESCE($3, coordinates), \
                 updated_at = NOW() \
             WHERE id = $4 AND ($5::INTEGER IS NULL OR map_id = $5) RETURNING {}",
            ZONE_COLUMNS
        );
        let zone = sqlx::query_as::<_, Zone>(&sql)
            .bind(&patch.name)
            .bind(&patch.color)
            .bind(&patch.coordinates)
            .bind(id)
            .bind(map_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(classify_sqlx_error)?;
        if zone.is_none() {
            debug!("Zone {} matched no row", id);
        }
        Ok(zone)
    }

    async fn delete_zone(&mut self, id: &str) -> Result<Option<ZoneId>, StoreError> {
        let deleted: Option<(ZoneId,)> = sqlx::query_as("DELETE FROM zones WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(deleted.map(|(id,)| id))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Surface integrity violations (foreign keys, NOT NULL, uniqueness) as
/// constraint errors so logs name the constraint
fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(constraint) = db_err.constraint() {
            return StoreError::Constraint(format!("{} ({})", constraint, db_err.message()));
        }
    }
    StoreError::Sqlx(err)
}
