use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::config;
use crate::handlers;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let config = config();

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(map_routes())
        .merge(zone_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn map_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/api/maps", post(handlers::map_post))
        .route(
            "/api/maps/:map_id",
            get(handlers::map_get)
                .put(handlers::map_put)
                .delete(handlers::map_delete),
        )
        // Zone set of a map; PUT reconciles
        .route(
            "/api/maps/:map_id/zones",
            get(handlers::map_zones_get).put(handlers::map_zones_put),
        )
}

fn zone_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/api/zones", post(handlers::zone_post))
        .route(
            "/api/zones/:zone_id",
            get(handlers::zone_get)
                .put(handlers::zone_put)
                .delete(handlers::zone_delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if crate::is_development!() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
