use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::record::ZoneRecord;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::utils::json_body;

/// POST /api/zones - create a single zone
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let record = ZoneRecord::from_json(json_body(payload)?)?;
    let zone = state.zones.create_zone(record).await?;
    Ok(ApiResponse::created(json!({ "zone": zone })))
}

/// GET /api/zones/:zone_id
pub async fn get(State(state): State<AppState>, Path(zone_id): Path<String>) -> ApiResult<Value> {
    let zone = state.zones.get_zone(&zone_id).await?;
    Ok(ApiResponse::success(json!({ "zone": zone })))
}

/// PUT /api/zones/:zone_id
pub async fn put(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let record = ZoneRecord::from_json(json_body(payload)?)?;
    let zone = state.zones.update_zone(&zone_id, record).await?;
    Ok(ApiResponse::success(json!({ "zone": zone })))
}

/// DELETE /api/zones/:zone_id
pub async fn delete(State(state): State<AppState>, Path(zone_id): Path<String>) -> ApiResult<()> {
    state.zones.delete_zone(&zone_id).await?;
    Ok(ApiResponse::success(()).with_message("Zone deleted successfully"))
}
