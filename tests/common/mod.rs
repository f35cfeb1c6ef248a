#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use zonemap_api::database::MemoryStore;
use zonemap_api::{app, AppState};

pub const CUSTOMER_ID: i32 = 1;

/// The full router over a fresh in-memory store with one customer
pub struct TestApp {
    pub store: MemoryStore,
    router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = MemoryStore::new();
        store.add_customer(CUSTOMER_ID).await;
        let router = app(AppState::new(Arc::new(store.clone())));
        Self { store, router }
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, None).await
    }

    /// Send raw bytes as a JSON body, for malformed payloads
    pub async fn put_raw(&self, uri: &str, body: &'static str) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))?;
        self.dispatch(request).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = serde_json::from_slice(&bytes)
            .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?;
        Ok((status, json))
    }

    /// Create a map through the API and return its id
    pub async fn create_map(&self, title: &str) -> Result<i64> {
        let (status, body) = self
            .post(
                "/api/maps",
                serde_json::json!({ "customer_id": CUSTOMER_ID, "title": title }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create map failed: {} {}", status, body);
        body["map"]["map_id"].as_i64().context("map_id missing")
    }
}

pub fn square(offset: f64) -> Value {
    serde_json::json!([
        {"lat": 52.0 + offset, "lng": 4.0},
        {"lat": 52.0 + offset, "lng": 4.1},
        {"lat": 52.1 + offset, "lng": 4.1}
    ])
}

/// Services over a real Postgres, for tests that need one
pub struct PgFixture {
    pub pool: sqlx::PgPool,
    pub maps: zonemap_api::services::MapService,
    pub zones: zonemap_api::services::ZoneService,
    pub customer_id: i32,
}

static SCHEMA_APPLIED: once_cell::sync::Lazy<tokio::sync::OnceCell<()>> =
    once_cell::sync::Lazy::new(tokio::sync::OnceCell::new);

impl PgFixture {
    /// `None` when DATABASE_URL is unset; callers return early
    pub async fn connect() -> Result<Option<Self>> {
        use zonemap_api::config::config;
        use zonemap_api::database::{DatabaseManager, PgStore, TransactionalStore};

        let _ = dotenvy::dotenv();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping Postgres test");
            return Ok(None);
        };

        let pool = DatabaseManager::connect(&url, &config().database).await?;
        SCHEMA_APPLIED
            .get_or_try_init(|| DatabaseManager::migrate(&pool))
            .await?;

        // Fresh customer per test so concurrent tests never share rows
        let customer_id: i32 =
            sqlx::query_scalar("INSERT INTO customer (email) VALUES ($1) RETURNING customer_id")
                .bind(format!("{}@zonemap.test", uuid::Uuid::new_v4()))
                .fetch_one(&pool)
                .await?;

        let store: Arc<dyn TransactionalStore> = Arc::new(PgStore::new(pool.clone()));
        Ok(Some(Self {
            pool,
            maps: zonemap_api::services::MapService::new(store.clone()),
            zones: zonemap_api::services::ZoneService::new(store),
            customer_id,
        }))
    }

    pub async fn create_map(&self, title: &str) -> Result<i32> {
        use zonemap_api::database::models::MapDraft;

        let map = self
            .maps
            .create_map(MapDraft {
                customer_id: self.customer_id,
                title: title.to_string(),
                description: String::new(),
                country: None,
                active: true,
                map_code: None,
                map_data: MapDraft::default_map_data(),
                map_bounds: MapDraft::default_map_bounds(),
            })
            .await?;
        Ok(map.map_id)
    }

    pub async fn zone_count(&self, map_id: i32) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM zones WHERE map_id = $1")
            .bind(map_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn link_count(&self, map_id: i32) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM customer_map WHERE map_id = $1")
            .bind(map_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
