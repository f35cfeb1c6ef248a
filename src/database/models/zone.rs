use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::types::{CustomerId, MapId, ZoneId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Zone {
    pub id: ZoneId,
    pub map_id: MapId,
    pub name: String,
    pub color: String,
    /// Ordered polygon vertices, stored as submitted
    pub coordinates: Value,
    pub customer_id: Option<CustomerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for a zone insert
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDraft {
    pub name: String,
    pub color: String,
    pub coordinates: Value,
    pub customer_id: Option<CustomerId>,
}

/// Column changes for a zone update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZonePatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub coordinates: Option<Value>,
}

impl ZonePatch {
    /// Apply the patch to an in-memory copy, mirroring `COALESCE(new, old)`
    pub fn apply_to(&self, zone: &mut Zone) {
        if let Some(name) = &self.name {
            zone.name = name.clone();
        }
        if let Some(color) = &self.color {
            zone.color = color.clone();
        }
        if let Some(coordinates) = &self.coordinates {
            zone.coordinates = coordinates.clone();
        }
    }
}

/// A client-submitted zone, classified once at the request boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneInput {
    New(ZoneDraft),
    Existing { id: ZoneId, patch: ZonePatch },
}

impl ZoneInput {
    pub fn is_new(&self) -> bool {
        matches!(self, ZoneInput::New(_))
    }
}
