//! Integration tests for the API server.

use std::sync::OnceLock;
use std::time::Duration;

use api::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use clients::{InMemoryAccountService, InMemoryCatalogService, Product};
use domain::{Money, OrderService, OrderServiceConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::InMemoryOrderRepository;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct Fakes {
    repository: InMemoryOrderRepository,
    accounts: InMemoryAccountService,
    catalog: InMemoryCatalogService,
}

async fn setup() -> (axum::Router, Fakes) {
    let repository = InMemoryOrderRepository::new();
    let accounts = InMemoryAccountService::new();
    let catalog = InMemoryCatalogService::new();

    accounts.add_account("A1", "Alice").await;
    catalog
        .upsert_product(Product::new("P1", "Widget", "A widget", Money::from_cents(1000)))
        .await;
    catalog
        .upsert_product(Product::new("P2", "Gadget", "A gadget", Money::from_cents(250)))
        .await;

    let service = OrderService::with_config(
        repository.clone(),
        accounts.clone(),
        catalog.clone(),
        OrderServiceConfig {
            remote_timeout: Duration::from_secs(2),
        },
    );
    let app = api::create_app(AppState::new(service), get_metrics_handle());

    (
        app,
        Fakes {
            repository,
            accounts,
            catalog,
        },
    )
}

fn post_order(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_health_check_reports_store_outage() {
    let (app, fakes) = setup().await;
    fakes.repository.set_fail_on_read(true).await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["status"], "unavailable");
}

#[tokio::test]
async fn test_create_order() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [
                { "product_id": "P1", "quantity": 2 },
                { "product_id": "P2", "quantity": 4 }
            ]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = json_body(response).await;
    assert!(json["id"].as_str().is_some());
    assert!(json["created_at"].as_str().is_some());
    assert_eq!(json["account_id"], "A1");
    assert_eq!(json["total_price"], 30.0);
    assert_eq!(json["products"][0]["id"], "P1");
    assert_eq!(json["products"][0]["name"], "Widget");
    assert_eq!(json["products"][0]["price"], 10.0);
    assert_eq!(json["products"][1]["quantity"], 4);
}

#[tokio::test]
async fn test_create_and_list_orders() {
    let (app, _) = setup().await;

    let created = app
        .clone()
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [{ "product_id": "P2", "quantity": 3 }]
        })))
        .await
        .unwrap();
    let created = json_body(created).await;

    let response = app.oneshot(get("/accounts/A1/orders")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0], created);
}

#[tokio::test]
async fn test_list_orders_for_account_without_orders() {
    let (app, _) = setup().await;

    let response = app.oneshot(get("/accounts/A9/orders")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_zero_quantity_is_bad_request() {
    let (app, fakes) = setup().await;

    let response = app
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [{ "product_id": "P1", "quantity": 0 }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].as_str().is_some());
    assert_eq!(fakes.accounts.call_count(), 0);
}

#[tokio::test]
async fn test_negative_quantity_is_bad_request() {
    let (app, fakes) = setup().await;

    let response = app
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [{ "product_id": "P1", "quantity": -2 }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fakes.accounts.call_count(), 0);
    assert_eq!(fakes.repository.order_count().await, 0);
}

#[tokio::test]
async fn test_oversized_quantity_is_counted_as_invalid_quantity() {
    let (app, fakes) = setup().await;

    let response = app
        .clone()
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [{ "product_id": "P1", "quantity": 4_294_967_296_i64 }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("4294967296"));
    assert!(error.contains("between 1 and 4294967295"));
    assert_eq!(fakes.accounts.call_count(), 0);

    let metrics = app.oneshot(get("/metrics")).await.unwrap();
    let body = axum::body::to_bytes(metrics.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("order_creation_failures_total{reason=\"invalid_quantity\"}"));
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let (app, fakes) = setup().await;

    let response = app
        .oneshot(post_order(json!({
            "account_id": "nobody",
            "products": [{ "product_id": "P1", "quantity": 1 }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(fakes.catalog.call_count(), 0);
}

#[tokio::test]
async fn test_catalog_outage_is_bad_gateway() {
    let (app, fakes) = setup().await;
    fakes.catalog.set_fail(true).await;

    let response = app
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [{ "product_id": "P1", "quantity": 1 }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_store_failures_are_internal_errors() {
    let (app, fakes) = setup().await;
    fakes.repository.set_fail_on_write(true).await;
    fakes.repository.set_fail_on_read(true).await;

    let create = app
        .clone()
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [{ "product_id": "P1", "quantity": 1 }]
        })))
        .await
        .unwrap();
    let list = app.oneshot(get("/accounts/A1/orders")).await.unwrap();

    assert_eq!(create.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(list.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup().await;

    app.clone()
        .oneshot(post_order(json!({
            "account_id": "A1",
            "products": [{ "product_id": "P1", "quantity": 1 }]
        })))
        .await
        .unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
}
