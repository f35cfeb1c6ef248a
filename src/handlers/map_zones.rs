use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::utils::{json_body, parse_map_id};

/// GET /api/maps/:map_id/zones - zones of a map, oldest first
pub async fn get(State(state): State<AppState>, Path(map_id): Path<String>) -> ApiResult<Value> {
    let map_id = parse_map_id(&map_id)?;
    let zones = state.zones.list_zones(map_id).await?;
    Ok(ApiResponse::success(json!({ "zones": zones })))
}

/// PUT /api/maps/:map_id/zones - reconcile the submitted zone set
///
/// Accepts `{"zones": [...]}` or a bare array. Saved zones come back in
/// submission order; entries naming an unknown zone are left out.
pub async fn put(
    State(state): State<AppState>,
    Path(map_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let map_id = parse_map_id(&map_id)?;
    let zones = state.zones.reconcile_json(map_id, json_body(payload)?).await?;
    let message = format!("{} zones saved", zones.len());
    Ok(ApiResponse::success(json!({ "zones": zones })).with_message(message))
}
