use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "name": "Zonemap API",
        "version": version,
        "description": "Map and zone management with transactional zone reconciliation",
        "endpoints": {
            "health": "/health",
            "maps": "/api/maps[/:map_id]",
            "map_zones": "/api/maps/:map_id/zones",
            "zones": "/api/zones[/:zone_id]",
        }
    }))
}

/// GET /health - liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.ping().await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable("database unavailable")
    })?;

    Ok(Json(json!({
        "success": true,
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
