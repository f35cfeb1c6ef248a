mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{square, TestApp, CUSTOMER_ID};

#[tokio::test]
async fn create_applies_default_view() -> Result<()> {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post("/api/maps", json!({ "customer_id": CUSTOMER_ID, "title": "Delivery areas" }))
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["map"]["title"], json!("Delivery areas"));
    assert_eq!(body["map"]["active"], json!(true));
    assert_eq!(body["map"]["map_data"]["zoom"], json!(2));
    Ok(())
}

#[tokio::test]
async fn create_without_title_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await;

    let (status, body) = app.post("/api/maps", json!({ "customer_id": CUSTOMER_ID })).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("BAD_REQUEST"));
    assert_eq!(body["error"], json!("Missing required field: title"));
    Ok(())
}

#[tokio::test]
async fn get_includes_zones() -> Result<()> {
    let app = TestApp::spawn().await;
    let map_id = app.create_map("Regions").await?;
    app.put(
        &format!("/api/maps/{}/zones", map_id),
        json!({ "zones": [{ "id": "temp-1", "name": "North", "color": "#f00", "coordinates": square(0.0) }] }),
    )
    .await?;

    let (status, body) = app.get(&format!("/api/maps/{}", map_id)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["map"]["map_id"], json!(map_id));
    assert_eq!(body["map"]["zones"][0]["name"], json!("North"));
    Ok(())
}

#[tokio::test]
async fn update_keeps_omitted_fields() -> Result<()> {
    let app = TestApp::spawn().await;
    let map_id = app.create_map("Before").await?;

    let (status, body) = app
        .put(&format!("/api/maps/{}", map_id), json!({ "title": "After", "active": false }))
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Map updated successfully"));
    assert_eq!(body["map"]["title"], json!("After"));
    assert_eq!(body["map"]["active"], json!(false));
    assert_eq!(body["map"]["map_data"]["zoom"], json!(2));
    Ok(())
}

#[tokio::test]
async fn delete_removes_map_zones_and_links() -> Result<()> {
    let app = TestApp::spawn().await;
    let map_id = app.create_map("Doomed").await?;
    app.put(
        &format!("/api/maps/{}/zones", map_id),
        json!([
            { "name": "A", "color": "#f00", "coordinates": square(0.0) },
            { "name": "B", "color": "#0f0", "coordinates": square(1.0) }
        ]),
    )
    .await?;
    app.store.link_customer(CUSTOMER_ID, map_id as i32).await?;

    let (status, body) = app.delete(&format!("/api/maps/{}", map_id)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["deleted_map_id"], json!(map_id));
    assert_eq!(body["message"], json!("Map and associated data deleted successfully"));
    assert_eq!(app.store.zone_count().await, 0);
    assert_eq!(app.store.link_count(map_id as i32).await, 0);

    let (status, _) = app.get(&format!("/api/maps/{}", map_id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_unknown_map_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await;

    let (status, body) = app.delete("/api/maps/999").await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("NOT_FOUND"));
    assert_eq!(body["error"], json!("Map 999 not found"));
    Ok(())
}

#[tokio::test]
async fn failed_delete_leaves_everything_in_place() -> Result<()> {
    let app = TestApp::spawn().await;
    let map_id = app.create_map("Sturdy").await?;
    app.put(
        &format!("/api/maps/{}/zones", map_id),
        json!([{ "name": "A", "color": "#f00", "coordinates": square(0.0) }]),
    )
    .await?;

    // The map row delete is the third statement
    app.store.fail_statement(3).await;
    let (status, _) = app.delete(&format!("/api/maps/{}", map_id)).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.map(map_id as i32).await.is_some());
    assert_eq!(app.store.zone_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn invalid_map_id_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await;

    for uri in ["/api/maps/abc", "/api/maps/0", "/api/maps/-4"] {
        let (status, body) = app.delete(uri).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], json!("Valid map ID required"));
    }
    Ok(())
}
