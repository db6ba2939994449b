//! HTTP surface tests
//!
//! Drives the full router over the in-memory store: wire shapes, status
//! codes and error envelopes as the POS clients see them.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use pos_backend::config::{Config, DatabaseConfig, ServerConfig, StoreConfig};
use pos_backend::store::MemoryStore;
use pos_backend::{create_app, AppState};

fn test_app() -> Router {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        store: StoreConfig {
            operation_timeout_secs: 5,
        },
    };
    create_app(AppState::new(config, Arc::new(MemoryStore::new())))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn add_item_body(name: &str) -> Value {
    json!({
        "name": name,
        "stock": 10,
        "unit": "kg",
        "minimum_stock": 2,
        "cost_per_unit": 5,
    })
}

#[tokio::test]
async fn test_add_item_and_list() {
    let app = test_app();

    let (status, body) = send(&app, post_json("/inventory/add-item", add_item_body("Tomatoes"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["name"], json!("Tomatoes"));

    // Listing returns a bare array
    let (status, body) = send(&app, get("/inventory")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["unit"], json!("kg"));
}

#[tokio::test]
async fn test_duplicate_name_conflict() {
    let app = test_app();

    send(&app, post_json("/inventory/add-item", add_item_body("Olive Oil"))).await;
    let (status, body) = send(
        &app,
        post_json("/inventory/add-item", add_item_body("OLIVE OIL")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("DUPLICATE_NAME"));
    assert_eq!(body["error"]["field"], json!("name"));
}

#[tokio::test]
async fn test_stock_flow_and_insufficient_stock() {
    let app = test_app();

    let (_, body) = send(&app, post_json("/inventory/add-item", add_item_body("Flour"))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_json(
            "/inventory/add-stock",
            json!({"ingredient_id": id, "quantity": 5, "cost_per_unit": 6, "supplier": "Acme"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Stock added successfully"));

    let (status, body) = send(
        &app,
        post_json(
            "/inventory/use-stock",
            json!({"ingredient_id": id, "quantity_used": 100, "usage_type": "sales", "order_id": "O1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INSUFFICIENT_STOCK"));

    // Failed stock-out left the balance alone
    let (_, body) = send(&app, get("/inventory")).await;
    assert_eq!(body[0]["stock"], json!("15"));
}

#[tokio::test]
async fn test_missing_field_reports_field_detail() {
    let app = test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/inventory/add-item",
            json!({"name": "Sugar", "unit": "kg", "cost_per_unit": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));
    assert_eq!(body["error"]["field"], json!("minimum_stock"));
}

#[tokio::test]
async fn test_dashboard_and_report_shapes() {
    let app = test_app();
    send(&app, post_json("/inventory/add-item", add_item_body("Rice"))).await;

    let (status, body) = send(&app, get("/inventory/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    // camelCase wire keys
    assert!(body.get("totalStockValue").is_some());
    assert!(body.get("lowStockCount").is_some());
    assert!(body.get("topIngredients").unwrap().is_array());

    let (status, body) = send(&app, get("/inventory/reports?period=today")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], json!("today"));
    assert!(body["summary"].get("totalStockInQty").is_some());
    assert!(body["itemUsage"].is_object());

    let (status, body) = send(&app, get("/inventory/reports?period=fortnight")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], json!("period"));
}

#[tokio::test]
async fn test_csv_export_headers() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get("/inventory/reports/export?period=last7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment; filename=\"inventory_report_last7_"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("Item,Stock In,Stock Out,Wastage,Cost"));
}

#[tokio::test]
async fn test_edit_delete_and_reconcile() {
    let app = test_app();
    let (_, body) = send(&app, post_json("/inventory/add-item", add_item_body("Basil"))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(format!("/inventory/{id}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "name": "Thai Basil",
                    "stock": 20,
                    "unit": "kg",
                    "minimum_stock": 2,
                    "cost_per_unit": 5,
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["manual_override"], json!(true));
    assert_eq!(body["data"]["name"], json!("Thai Basil"));

    // Manual override keeps the ledger reconcilable
    let (status, body) = send(&app, get(&format!("/inventory/{id}/reconcile"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["in_sync"], json!(true));

    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/inventory/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Item deleted"));

    let (status, _) = send(&app, get(&format!("/inventory/{id}/reconcile"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_store_status() {
    let app = test_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["store"], json!("connected"));
}
