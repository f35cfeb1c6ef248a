use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::MapId;

/// Parse a `:map_id` path segment; only positive integers name a map
pub fn parse_map_id(raw: &str) -> Result<MapId, ApiError> {
    match raw.trim().parse::<MapId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request("Valid map ID required")),
    }
}

/// Unwrap a JSON body, turning axum's rejection into the error envelope
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    let Json(body) = payload?;
    Ok(body)
}
