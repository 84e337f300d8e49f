//! HTTP API 集成测试
//!
//! 通过完整路由栈 (认证中间件 + 处理器) 驱动，内存数据库。

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use forecourt_server::auth::JwtConfig;
use forecourt_server::db::DbService;
use forecourt_server::payment::SimulatedGateway;
use forecourt_server::{Config, ServerState, api};

async fn test_state() -> ServerState {
    let db = DbService::memory().await.expect("memory db").db;
    let config = Config {
        work_dir: "/tmp/forecourt-test".to_string(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-key-0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "forecourt-server".to_string(),
            audience: "forecourt-clients".to_string(),
        },
        environment: "test".to_string(),
        gateway_latency: Duration::ZERO,
        gateway_decline_rate: 0.0,
    };
    ServerState::with_db(config, db, Arc::new(SimulatedGateway::always_approve()))
}

fn token(state: &ServerState, id: &str, role: &str) -> String {
    state
        .jwt_service
        .generate_token(&format!("user:{id}"), id, role)
        .expect("token")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn vehicle_payload(vin: &str) -> Value {
    json!({
        "make": "Renault",
        "model": "Clio",
        "year": 2025,
        "vin": vin,
        "base_price": 21500.0
    })
}

fn order_payload(vehicle_id: &str) -> Value {
    json!({
        "vehicle_id": vehicle_id,
        "payment_method": "bank_transfer",
        "shipping": {
            "address_line": "42 Rue de Test",
            "city": "Paris",
            "postal_code": "75001",
            "country": "FR"
        }
    })
}

/// Seed one vehicle as admin and return its id (bare key)
async fn seed_vehicle(app: &Router, admin: &str, vin: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/vehicles",
        Some(admin),
        Some(vehicle_payload(vin)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().expect("vehicle id").to_string()
}

fn bare(id: &str) -> &str {
    id.rsplit(':').next().unwrap_or(id)
}

#[tokio::test]
async fn test_health_is_public() {
    let state = test_state().await;
    let app = api::router(state);

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_token() {
    let state = test_state().await;
    let app = api::router(state);

    let (status, body) = send(&app, "GET", "/api/vehicles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let state = test_state().await;
    let app = api::router(state);

    let (status, body) = send(&app, "GET", "/api/vehicles", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn test_vehicle_create_requires_admin() {
    let state = test_state().await;
    let customer = token(&state, "cust1", "customer");
    let app = api::router(state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/vehicles",
        Some(&customer),
        Some(vehicle_payload("HTTPVIN1")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");
}

#[tokio::test]
async fn test_vehicle_create_and_list() {
    let state = test_state().await;
    let admin = token(&state, "boss", "admin");
    let customer = token(&state, "cust1", "customer");
    let app = api::router(state);

    seed_vehicle(&app, &admin, "HTTPVIN2").await;

    // Duplicate VIN conflicts
    let (status, body) = send(
        &app,
        "POST",
        "/api/vehicles",
        Some(&admin),
        Some(vehicle_payload("HTTPVIN2")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // Customers can browse
    let (status, body) = send(&app, "GET", "/api/vehicles", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["availability"]["status"], "In Stock");
}

#[tokio::test]
async fn test_order_create_pay_and_status() {
    let state = test_state().await;
    let admin = token(&state, "boss", "admin");
    let customer = token(&state, "cust1", "customer");
    let app = api::router(state);

    let vehicle_id = seed_vehicle(&app, &admin, "HTTPVIN3").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&customer),
        Some(order_payload(&vehicle_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["amount"], 21500.0);
    let order_id = bare(body["data"]["id"].as_str().expect("order id")).to_string();

    // my-orders shows it
    let (status, body) = send(&app, "GET", "/api/orders/my-orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    // pay
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/payments/process/{order_id}"),
        Some(&customer),
        Some(json!({"payment_method": "bank_transfer", "amount": 21500.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "completed");
    let txn_number = body["data"]["transaction_number"]
        .as_str()
        .expect("txn number")
        .to_string();
    assert!(txn_number.starts_with("TXN-"));

    // payment status view
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/payments/status/{order_id}"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "paid");

    // second payment conflicts
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/payments/process/{order_id}"),
        Some(&customer),
        Some(json!({"payment_method": "bank_transfer", "amount": 21500.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");

    // ledger is admin only
    let (status, _) = send(&app, "GET", "/api/transactions", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/transactions", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/transactions/{txn_number}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["number"], txn_number.as_str());
}

#[tokio::test]
async fn test_strangers_order_is_forbidden() {
    let state = test_state().await;
    let admin = token(&state, "boss", "admin");
    let owner = token(&state, "cust1", "customer");
    let stranger = token(&state, "cust2", "customer");
    let app = api::router(state);

    let vehicle_id = seed_vehicle(&app, &admin, "HTTPVIN4").await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&owner),
        Some(order_payload(&vehicle_id)),
    )
    .await;
    let order_id = bare(body["data"]["id"].as_str().expect("order id")).to_string();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/orders/{order_id}"),
        Some(&stranger),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    // Admin can read anyone's order
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/orders/{order_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_status_route_and_invalid_transition() {
    let state = test_state().await;
    let admin = token(&state, "boss", "admin");
    let customer = token(&state, "cust1", "customer");
    let app = api::router(state);

    let vehicle_id = seed_vehicle(&app, &admin, "HTTPVIN5").await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&customer),
        Some(order_payload(&vehicle_id)),
    )
    .await;
    let order_id = bare(body["data"]["id"].as_str().expect("order id")).to_string();

    // Customers cannot drive the status machine
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/orders/{order_id}/status"),
        Some(&customer),
        Some(json!({"status": "confirmed"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // pending -> completed is not a legal edge
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/orders/{order_id}/status"),
        Some(&admin),
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0005");

    // pending -> confirmed is
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/orders/{order_id}/status"),
        Some(&admin),
        Some(json!({"status": "confirmed", "description": "deposit received"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "confirmed");
}

#[tokio::test]
async fn test_admin_refund_via_transactions_surface() {
    let state = test_state().await;
    let admin = token(&state, "boss", "admin");
    let customer = token(&state, "cust1", "customer");
    let app = api::router(state);

    let vehicle_id = seed_vehicle(&app, &admin, "HTTPVIN6").await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&customer),
        Some(order_payload(&vehicle_id)),
    )
    .await;
    let order_id = bare(body["data"]["id"].as_str().expect("order id")).to_string();

    // Admin takes the payment over the ledger surface
    let (status, body) = send(
        &app,
        "POST",
        "/api/transactions/process-payment",
        Some(&admin),
        Some(json!({
            "order_id": order_id,
            "payment_method": "cash",
            "amount": 21500.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let txn_number = body["data"]["transaction_number"]
        .as_str()
        .expect("txn number")
        .to_string();

    for target in ["confirmed", "completed"] {
        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/orders/{order_id}/status"),
            Some(&admin),
            Some(json!({"status": target})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/transactions/process-refund",
        Some(&admin),
        Some(json!({
            "order_id": order_id,
            "transaction_number": txn_number,
            "reason": "vehicle returned"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/orders/{order_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "refunded");

    // The vehicle is back in stock
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/vehicles/{}", bare(&vehicle_id)),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(body["data"]["availability"]["status"], "In Stock");
}

#[tokio::test]
async fn test_availability_endpoint_limits() {
    let state = test_state().await;
    let admin = token(&state, "boss", "admin");
    let customer = token(&state, "cust1", "customer");
    let app = api::router(state);

    let vehicle_id = seed_vehicle(&app, &admin, "HTTPVIN7").await;
    let key = bare(&vehicle_id).to_string();

    // In Stock -> In Transit is a legal manual flip
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/vehicles/{key}/availability"),
        Some(&admin),
        Some(json!({"status": "In Transit"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["availability"]["status"], "In Transit");

    // Sold cannot be set by hand
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/vehicles/{key}/availability"),
        Some(&admin),
        Some(json!({"status": "Sold"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0005");

    // An ordered (reserved) vehicle cannot be flipped manually either
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/vehicles/{key}/availability"),
        Some(&admin),
        Some(json!({"status": "In Stock"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&customer),
        Some(order_payload(&key)),
    )
    .await;
    assert_eq!(body["data"]["status"], "pending");
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/vehicles/{key}/availability"),
        Some(&admin),
        Some(json!({"status": "In Transit"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
