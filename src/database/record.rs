// Request-side records: raw JSON from the map editor, validated and turned
// into typed drafts, patches and zone inputs before any statement runs.
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::database::models::{MapChanges, MapDraft, ZoneDraft, ZoneInput, ZonePatch};
use crate::types::{classify, CustomerId, MapId, ZoneIdentity};

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Zone belongs to map {found}, not map {expected}")]
    MapMismatch { expected: MapId, found: MapId },
}

/// A zone object as submitted by the client
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ZoneRecord {
    pub id: Option<String>,
    pub map_id: Option<MapId>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub coordinates: Option<Value>,
    pub customer_id: Option<CustomerId>,
}

impl ZoneRecord {
    /// Parse a single zone object
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        match json {
            Value::Object(_) => {
                serde_json::from_value(json).map_err(|e| RecordError::InvalidJson(e.to_string()))
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    /// Parse an array of zone objects, reporting the offending index
    pub fn from_json_array(json: Value) -> Result<Vec<Self>, RecordError> {
        match json {
            Value::Array(array) => {
                let mut records = Vec::with_capacity(array.len());
                for (index, item) in array.into_iter().enumerate() {
                    let record = Self::from_json(item)
                        .map_err(|e| RecordError::InvalidJson(format!("Item {}: {}", index, e)))?;
                    records.push(record);
                }
                Ok(records)
            }
            _ => Err(RecordError::InvalidJson("Expected JSON array".to_string())),
        }
    }

    pub fn identity(&self) -> ZoneIdentity<'_> {
        classify(self.id.as_deref())
    }

    /// Classify the record and build the matching zone input for `map_id`
    pub fn into_input(self, map_id: MapId) -> Result<ZoneInput, RecordError> {
        if let Some(found) = self.map_id {
            if found != map_id {
                return Err(RecordError::MapMismatch { expected: map_id, found });
            }
        }

        let existing_id = match self.identity() {
            ZoneIdentity::New => None,
            ZoneIdentity::Existing(id) => Some(id.to_string()),
        };

        match existing_id {
            None => Ok(ZoneInput::New(self.into_draft()?)),
            Some(id) => Ok(ZoneInput::Existing { id, patch: self.into_patch()? }),
        }
    }

    /// Values for an insert; name, color and coordinates are required
    pub fn into_draft(self) -> Result<ZoneDraft, RecordError> {
        let name = non_blank(self.name).ok_or(RecordError::MissingRequiredField("name"))?;
        let color = non_blank(self.color).ok_or(RecordError::MissingRequiredField("color"))?;
        let coordinates = self
            .coordinates
            .ok_or(RecordError::MissingRequiredField("coordinates"))?;
        validate_coordinates(&coordinates)?;

        Ok(ZoneDraft {
            name,
            color,
            coordinates,
            customer_id: self.customer_id,
        })
    }

    /// Values for an update; omitted or blank fields keep the stored value
    pub fn into_patch(self) -> Result<ZonePatch, RecordError> {
        if let Some(coordinates) = &self.coordinates {
            validate_coordinates(coordinates)?;
        }

        Ok(ZonePatch {
            name: non_blank(self.name),
            color: non_blank(self.color),
            coordinates: self.coordinates,
        })
    }
}

/// Parse a reconciliation body: either `{"zones": [...]}` or a bare array
pub fn zone_inputs_from_json(json: Value, map_id: MapId) -> Result<Vec<ZoneInput>, RecordError> {
    let zones = match json {
        Value::Array(array) => Value::Array(array),
        Value::Object(mut body) => match body.remove("zones") {
            Some(zones @ Value::Array(_)) => zones,
            _ => return Err(RecordError::InvalidJson("Zones array is required".to_string())),
        },
        _ => return Err(RecordError::InvalidJson("Zones array is required".to_string())),
    };

    ZoneRecord::from_json_array(zones)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            record.into_input(map_id).map_err(|e| match e {
                RecordError::InvalidJson(msg) => {
                    RecordError::InvalidJson(format!("Item {}: {}", index, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// A map object as submitted by the client
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapRecord {
    pub customer_id: Option<CustomerId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub active: Option<bool>,
    pub map_code: Option<String>,
    pub map_data: Option<Value>,
    pub map_bounds: Option<Value>,
}

impl MapRecord {
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        match json {
            Value::Object(_) => {
                serde_json::from_value(json).map_err(|e| RecordError::InvalidJson(e.to_string()))
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    /// Values for an insert, with the editor's default view applied
    pub fn into_draft(self) -> Result<MapDraft, RecordError> {
        let title = non_blank(self.title).ok_or(RecordError::MissingRequiredField("title"))?;
        let customer_id = self
            .customer_id
            .ok_or(RecordError::MissingRequiredField("customer_id"))?;

        Ok(MapDraft {
            customer_id,
            title,
            description: self.description.unwrap_or_default(),
            country: non_blank(self.country),
            active: self.active.unwrap_or(true),
            map_code: non_blank(self.map_code),
            map_data: self.map_data.unwrap_or_else(MapDraft::default_map_data),
            map_bounds: self.map_bounds.unwrap_or_else(MapDraft::default_map_bounds),
        })
    }

    pub fn into_changes(self) -> Result<MapChanges, RecordError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(RecordError::InvalidField {
                field: "title",
                reason: "must not be blank".to_string(),
            });
        }

        Ok(MapChanges {
            title: self.title,
            description: non_blank(self.description),
            country: non_blank(self.country),
            active: self.active,
            map_data: self.map_data,
            map_bounds: self.map_bounds,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_coordinates(coordinates: &Value) -> Result<(), RecordError> {
    if coordinates.is_array() {
        Ok(())
    } else {
        Err(RecordError::InvalidField {
            field: "coordinates",
            reason: "expected an array of points".to_string(),
        })
    }
}
