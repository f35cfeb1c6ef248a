use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::database::models::zone::Zone;
use crate::types::{CustomerId, MapId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Map {
    pub map_id: MapId,
    pub customer_id: CustomerId,
    pub title: String,
    pub description: String,
    pub country: Option<String>,
    pub active: bool,
    pub map_code: Option<String>,
    /// Display configuration: center point and zoom
    pub map_data: Value,
    pub map_bounds: Value,
    pub created_at: DateTime<Utc>,
}

/// A map together with every zone it owns, oldest zone first
#[derive(Debug, Clone, Serialize)]
pub struct MapWithZones {
    #[serde(flatten)]
    pub map: Map,
    pub zones: Vec<Zone>,
}

/// Fully-defaulted values for a map insert
#[derive(Debug, Clone, PartialEq)]
pub struct MapDraft {
    pub customer_id: CustomerId,
    pub title: String,
    pub description: String,
    pub country: Option<String>,
    pub active: bool,
    pub map_code: Option<String>,
    pub map_data: Value,
    pub map_bounds: Value,
}

impl MapDraft {
    pub fn default_map_data() -> Value {
        json!({ "lat": 20, "lng": 0, "zoom": 2 })
    }

    pub fn default_map_bounds() -> Value {
        json!({ "center": [20, 0], "zoom": 2 })
    }
}

/// Column changes for a map update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub active: Option<bool>,
    pub map_data: Option<Value>,
    pub map_bounds: Option<Value>,
}

impl MapChanges {
    /// Apply the changes to an in-memory copy, mirroring `COALESCE(new, old)`
    pub fn apply_to(&self, map: &mut Map) {
        if let Some(title) = &self.title {
            map.title = title.clone();
        }
        if let Some(description) = &self.description {
            map.description = description.clone();
        }
        if let Some(country) = &self.country {
            map.country = Some(country.clone());
        }
        if let Some(active) = self.active {
            map.active = active;
        }
        if let Some(map_data) = &self.map_data {
            map.map_data = map_data.clone();
        }
        if let Some(map_bounds) = &self.map_bounds {
            map.map_bounds = map_bounds.clone();
        }
    }
}
