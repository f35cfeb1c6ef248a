use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::record::MapRecord;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DeletedMap;
use crate::state::AppState;

use super::utils::{json_body, parse_map_id};

/// POST /api/maps - create a map for a customer
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let draft = MapRecord::from_json(json_body(payload)?)?.into_draft()?;
    let map = state.maps.create_map(draft).await?;
    Ok(ApiResponse::created(json!({ "map": map })))
}

/// GET /api/maps/:map_id - map with its zones
pub async fn get(State(state): State<AppState>, Path(map_id): Path<String>) -> ApiResult<Value> {
    let map_id = parse_map_id(&map_id)?;
    let map = state.maps.get_map(map_id).await?;
    Ok(ApiResponse::success(json!({ "map": map })))
}

/// PUT /api/maps/:map_id - update map metadata
pub async fn put(
    State(state): State<AppState>,
    Path(map_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let map_id = parse_map_id(&map_id)?;
    let changes = MapRecord::from_json(json_body(payload)?)?.into_changes()?;
    let map = state.maps.update_map(map_id, changes).await?;
    Ok(ApiResponse::success(json!({ "map": map })).with_message("Map updated successfully"))
}

/// DELETE /api/maps/:map_id - remove the map, its zones and customer links
pub async fn delete(State(state): State<AppState>, Path(map_id): Path<String>) -> ApiResult<DeletedMap> {
    let map_id = parse_map_id(&map_id)?;
    let deleted = state.maps.delete_map(map_id).await?;
    Ok(ApiResponse::success(deleted).with_message("Map and associated data deleted successfully"))
}
