// =====================================
// tests/integration/payment_flow_tests.rs
// =====================================
//! Checkout, confirmation and purchase history over HTTP
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use backend_lib::{storage::JsonFileStore, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::test_utils::{
    app, register_and_login, send, setup_test_env, setup_with, test_settings, StubGateway,
};

fn cart(email: &str) -> Value {
    json!({
        "customer_email": email,
        "items": [
            { "name": "Feijão 1kg", "unit_price": 8.99, "quantity": 3 },
            { "name": "Azeite 500ml", "unit_price": 32.5, "quantity": 1 },
        ],
    })
}

#[tokio::test]
async fn test_checkout_then_success_marks_order_paid() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let restaurant = register_and_login(&app, "/restaurants", "chef@x.com", "secret1").await;

    let (status, session) = send(&app, Method::POST, "/payment/checkout", None, Some(cart("Chef@X.com"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["session_id"], "cs_test_1");
    assert_eq!(session["checkout_url"], "https://checkout.test/pay/cs_test_1");

    let (status, history) = send(
        &app,
        Method::GET,
        "/restaurants/purchase-history",
        Some(&restaurant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let orders = history.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[0]["total"], 59.47);
    assert_eq!(orders[0]["items"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Method::GET,
        "/payment/success?session_id=cs_test_1",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "cs_test_1");

    let (_, history) = send(
        &app,
        Method::GET,
        "/restaurants/purchase-history",
        Some(&restaurant),
        None,
    )
    .await;
    assert_eq!(history[0]["status"], "paid");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (state, _temp_dir) = setup_test_env();
    let (status, body) = send(
        &app(&state),
        Method::GET,
        "/payment/success?session_id=cs_missing",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NF_001");
}

#[tokio::test]
async fn test_success_without_session_id() {
    let (state, _temp_dir) = setup_test_env();
    let (status, body) = send(&app(&state), Method::GET, "/payment/success", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_oversized_cart_is_rejected() {
    let gateway = Arc::new(StubGateway::default());
    let (state, _temp_dir) = setup_with(|_| {}, gateway.clone());
    let app = app(&state);

    let huge = json!({
        "customer_email": "chef@x.com",
        "items": [{ "name": "Gold-plated wok", "unit_price": 1.0e17, "quantity": 1000 }],
    });
    let (status, body) = send(&app, Method::POST, "/payment/checkout", None, Some(huge)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
    assert_eq!(gateway.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_leaves_orders_alone() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    send(&app, Method::POST, "/payment/checkout", None, Some(cart("chef@x.com"))).await;

    let (status, body) = send(&app, Method::GET, "/payment/cancel", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    assert!(body.get("session_id").is_none());

    let orders = state.orders.history("chef@x.com").await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, marketplace_common::OrderStatus::Pending);
}

#[tokio::test]
async fn test_invalid_carts_never_reach_the_gateway() {
    let gateway = Arc::new(StubGateway::default());
    let (state, _temp_dir) = setup_with(|_| {}, gateway.clone());
    let app = app(&state);

    let empty = json!({ "customer_email": "chef@x.com", "items": [] });
    let (status, body) = send(&app, Method::POST, "/payment/checkout", None, Some(empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");

    let zero = json!({
        "customer_email": "chef@x.com",
        "items": [{ "name": "Sal", "unit_price": 2.0, "quantity": 0 }],
    });
    let (status, _) = send(&app, Method::POST, "/payment/checkout", None, Some(zero)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(gateway.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_gateway_failure_is_a_bad_gateway() {
    let (state, _temp_dir) = setup_with(|_| {}, Arc::new(StubGateway::failing()));
    let app = app(&state);

    let (status, body) = send(&app, Method::POST, "/payment/checkout", None, Some(cart("chef@x.com"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "PAY_001");
    assert!(state.orders.history("chef@x.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unconfigured_processor_key() {
    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(&temp_dir);
    let storage = JsonFileStore::open(&settings.storage.path).unwrap();
    // default settings carry the placeholder key
    let state = Arc::new(AppState::new(storage, settings).unwrap());

    let (status, body) = send(
        &app(&state),
        Method::POST,
        "/payment/checkout",
        None,
        Some(cart("chef@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CFG_001");
}

#[tokio::test]
async fn test_purchase_history_is_per_restaurant() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let chef = register_and_login(&app, "/restaurants", "chef@x.com", "secret1").await;
    let customer = register_and_login(&app, "/customers", "a@x.com", "secret1").await;

    send(&app, Method::POST, "/payment/checkout", None, Some(cart("other@x.com"))).await;

    let (_, history) = send(&app, Method::GET, "/restaurants/purchase-history", Some(&chef), None).await;
    assert!(history.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        Method::GET,
        "/restaurants/purchase-history",
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
