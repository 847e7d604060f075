// =====================================
// tests/integration/catalog_flow_tests.rs
// =====================================
//! Product catalog and supplier payment methods over HTTP
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use crate::test_utils::{app, register_and_login, send, setup_test_env};

fn rice(price: f64) -> Value {
    json!({
        "name": "Arroz agulhinha 5kg",
        "category": "grains",
        "supplier_id": 1,
        "sells_retail": true,
        "retail_price": price,
        "initial_stock": 40,
        "promotion_start": "2026-01-01",
        "promotion_end": "2026-01-31",
        "discount_percent": 10.0,
    })
}

#[tokio::test]
async fn test_product_crud() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let supplier = register_and_login(&app, "/suppliers", "farm@x.com", "secret1").await;

    let (status, created) = send(&app, Method::POST, "/products", Some(&supplier), Some(rice(25.9))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["name"], "Arroz agulhinha 5kg");
    assert_eq!(created["promotion_end"], "2026-01-31");

    // catalog reads are public
    let (status, listed) = send(&app, Method::GET, "/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, fetched) = send(&app, Method::GET, &format!("/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, replaced) = send(
        &app,
        Method::PUT,
        &format!("/products/{id}"),
        Some(&supplier),
        Some(rice(23.5)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"].as_u64(), Some(id));
    assert_eq!(replaced["retail_price"], 23.5);

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{id}"), Some(&supplier), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NF_001");

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{id}"), Some(&supplier), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_ids_are_not_reused() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let supplier = register_and_login(&app, "/suppliers", "farm@x.com", "secret1").await;

    let (_, first) = send(&app, Method::POST, "/products", Some(&supplier), Some(rice(10.0))).await;
    let first_id = first["id"].as_u64().unwrap();
    send(&app, Method::DELETE, &format!("/products/{first_id}"), Some(&supplier), None).await;

    let (_, second) = send(&app, Method::POST, "/products", Some(&supplier), Some(rice(10.0))).await;
    assert!(second["id"].as_u64().unwrap() > first_id);
}

#[tokio::test]
async fn test_products_belong_to_their_supplier() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let farm = register_and_login(&app, "/suppliers", "farm@x.com", "secret1").await;
    let mill = register_and_login(&app, "/suppliers", "mill@x.com", "secret1").await;

    let mut claimed = rice(10.0);
    claimed["supplier_id"] = json!(99);
    let (status, created) = send(&app, Method::POST, "/products", Some(&farm), Some(claimed)).await;
    assert_eq!(status, StatusCode::CREATED);
    let farm_id = created["supplier_id"].as_u64().unwrap();
    assert_ne!(farm_id, 99);
    let path = format!("/products/{}", created["id"]);

    let (_, flour) = send(&app, Method::POST, "/products", Some(&mill), Some(rice(4.0))).await;
    assert_ne!(flour["supplier_id"].as_u64().unwrap(), farm_id);

    let (status, body) = send(&app, Method::PUT, &path, Some(&mill), Some(rice(1.0))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "AUTH_004");
    let (status, _) = send(&app, Method::DELETE, &path, Some(&mill), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, unchanged) = send(&app, Method::GET, &path, None, None).await;
    assert_eq!(unchanged["retail_price"], 10.0);

    let (status, listed) = send(
        &app,
        Method::GET,
        &format!("/products?supplier_id={farm_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);

    let (_, nobody) = send(&app, Method::GET, "/products?supplier_id=99", None, None).await;
    assert!(nobody.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_product_requests() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let supplier = register_and_login(&app, "/suppliers", "farm@x.com", "secret1").await;

    let (status, body) = send(&app, Method::GET, "/products/not-a-number", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");

    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(&supplier),
        Some(json!({ "name": "Rice", "retail_price": "cheap" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");

    let (status, _) = send(&app, Method::GET, "/products?supplier_id=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_mutations_need_a_supplier() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let customer = register_and_login(&app, "/customers", "a@x.com", "secret1").await;

    let (status, _) = send(&app, Method::POST, "/products", Some(&customer), Some(rice(10.0))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::POST, "/products", None, Some(rice(10.0))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_product_is_rejected() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let supplier = register_and_login(&app, "/suppliers", "farm@x.com", "secret1").await;

    let mut product = rice(10.0);
    product["discount_percent"] = json!(150.0);
    let (status, body) = send(&app, Method::POST, "/products", Some(&supplier), Some(product)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");

    let (_, listed) = send(&app, Method::GET, "/products", None, None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_methods_are_owner_scoped() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let farm = register_and_login(&app, "/suppliers", "farm@x.com", "secret1").await;
    let mill = register_and_login(&app, "/suppliers", "mill@x.com", "secret1").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/suppliers/payment-methods",
        Some(&farm),
        Some(json!({ "method": "pix", "details": "farm@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["owner_email"], "farm@x.com");
    let path = format!("/suppliers/payment-methods/{}", created["id"]);

    let (status, listed) = send(&app, Method::GET, "/suppliers/payment-methods", Some(&farm), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, listed) = send(&app, Method::GET, "/suppliers/payment-methods", Some(&mill), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, &path, Some(&mill), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &path, Some(&mill), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &path,
        Some(&farm),
        Some(json!({ "method": "bank_transfer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["method"], "bank_transfer");

    let (status, _) = send(&app, Method::DELETE, &path, Some(&farm), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &path, Some(&farm), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_methods_reject_other_roles() {
    let (state, _temp_dir) = setup_test_env();
    let app = app(&state);
    let restaurant = register_and_login(&app, "/restaurants", "chef@x.com", "secret1").await;

    let (status, _) = send(
        &app,
        Method::GET,
        "/suppliers/payment-methods",
        Some(&restaurant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
