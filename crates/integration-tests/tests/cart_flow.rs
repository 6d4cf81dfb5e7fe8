//! Session cart through the HTTP surface: totals, coupons and shipping.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use lensway_integration_tests::{TestApp, envelope, frame_product, mount_get, shipping_methods};

fn dec(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_empty_cart() {
    let app = TestApp::start().await;

    let response = app.get("/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["item_count"], 0);
    assert_eq!(dec(&response.data()["total"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_subtotal_is_price_times_quantity() {
    let app = TestApp::start().await;

    app.add_product(1, "89.00", 2).await;
    let response = app.add_product(2, "12.50", 3).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["lines"].as_array().unwrap().len(), 2);
    assert_eq!(response.data()["item_count"], 5);
    assert_eq!(dec(&response.data()["subtotal"]), d("215.50"));

    // The session remembers the cart
    let again = app.get("/cart").await;
    assert_eq!(dec(&again.data()["subtotal"]), d("215.50"));
}

fn contact_lenses(right: u32, left: u32) -> Value {
    json!({
        "product_id": "acuvue-oasys",
        "customization": {
            "kind": "contact_lens",
            "right": { "quantity": right, "power": "-2.25" },
            "left": { "quantity": left, "power": "-2.50" }
        }
    })
}

async fn mount_contact_lenses(app: &TestApp) {
    mount_get(
        &app.backend,
        "/products/acuvue-oasys",
        json!({ "id": "acuvue-oasys", "name": "Acuvue Oasys", "price": "10.00" }),
    )
    .await;
}

#[tokio::test]
async fn test_contact_lens_line_prices_both_eyes() {
    let app = TestApp::start().await;
    mount_contact_lenses(&app).await;

    let response = app.post("/cart/items", &contact_lenses(2, 3)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(dec(&response.data()["subtotal"]), d("50.00"));
    assert_eq!(response.data()["item_count"], 5);
}

#[tokio::test]
async fn test_contact_lens_line_needs_boxes_and_keeps_eye_quantities() {
    let app = TestApp::start().await;
    mount_contact_lenses(&app).await;

    let empty = app.post("/cart/items", &contact_lenses(0, 0)).await;
    assert_eq!(empty.status, StatusCode::UNPROCESSABLE_ENTITY);

    let added = app.post("/cart/items", &contact_lenses(2, 3)).await;
    let line_id = added.data()["lines"][0]["id"].as_str().unwrap().to_string();

    let patched = app
        .json(
            Method::PATCH,
            &format!("/cart/items/{line_id}"),
            &json!({ "quantity": 10 }),
        )
        .await;
    assert_eq!(patched.status, StatusCode::UNPROCESSABLE_ENTITY);

    let cart = app.get("/cart").await;
    assert_eq!(dec(&cart.data()["subtotal"]), d("50.00"));
}

#[tokio::test]
async fn test_price_and_name_come_from_the_catalog() {
    let app = TestApp::start().await;
    mount_get(&app.backend, "/products/1", frame_product(1, "189.00")).await;

    let response = app
        .post(
            "/cart/items",
            &json!({
                "product_id": "1",
                "name": "Free glasses",
                "unit_price": "0.01",
                "quantity": 1
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let line = &response.data()["lines"][0];
    assert_eq!(line["name"], "Aviator Classic");
    assert_eq!(dec(&line["unit_price"]), d("189.00"));
    assert_eq!(dec(&response.data()["subtotal"]), d("189.00"));
}

#[tokio::test]
async fn test_unknown_product_is_not_added() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path("/products/999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })),
        )
        .mount(&app.backend)
        .await;

    let response = app.post("/cart/items", &json!({ "product_id": "999" })).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let cart = app.get("/cart").await;
    assert_eq!(cart.data()["item_count"], 0);
}

#[tokio::test]
async fn test_lens_lines_need_the_wizard() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(frame_product(1, "89.00"))))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app
        .post(
            "/cart/items",
            &json!({
                "product_id": "1",
                "customization": { "kind": "eyeglasses", "lens_type": "progressive" }
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_equal_lines_merge_and_quantity_updates() {
    let app = TestApp::start().await;

    app.add_product(1, "20.00", 1).await;
    let response = app.add_product(1, "20.00", 2).await;

    let lines = response.data()["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 3);

    let line_id = lines[0]["id"].as_str().unwrap().to_string();

    let updated = app
        .json(
            Method::PATCH,
            &format!("/cart/items/{line_id}"),
            &json!({ "quantity": 5 }),
        )
        .await;
    assert_eq!(dec(&updated.data()["subtotal"]), d("100.00"));

    let rejected = app
        .json(
            Method::PATCH,
            &format!("/cart/items/{line_id}"),
            &json!({ "quantity": 0 }),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(rejected.body["success"], false);

    let removed = app.delete(&format!("/cart/items/{line_id}")).await;
    assert_eq!(removed.data()["item_count"], 0);

    let missing = app.delete(&format!("/cart/items/{line_id}")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_coupon_replaces_subtotal_until_removed() {
    let app = TestApp::start().await;

    Mock::given(method("POST"))
        .and(path("/coupons/apply"))
        .and(body_partial_json(json!({ "code": "SPRING20", "subtotal": "100.00" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "code": "SPRING20",
            "discount_amount": "20.00",
            "final_total": "80.00"
        }))))
        .expect(1)
        .mount(&app.backend)
        .await;

    app.add_product(1, "50.00", 2).await;

    let applied = app.post("/cart/coupon", &json!({ "code": "SPRING20" })).await;
    assert_eq!(applied.status, StatusCode::OK);
    assert_eq!(applied.data()["coupon"]["code"], "SPRING20");
    assert_eq!(dec(&applied.data()["discount"]), d("20.00"));
    assert_eq!(dec(&applied.data()["total"]), d("80.00"));

    let removed = app.delete("/cart/coupon").await;
    assert!(removed.data().get("coupon").is_none());
    assert_eq!(dec(&removed.data()["total"]), d("100.00"));
}

#[tokio::test]
async fn test_coupon_rejection_is_surfaced() {
    let app = TestApp::start().await;

    Mock::given(method("POST"))
        .and(path("/coupons/apply"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Coupon has expired" })),
        )
        .mount(&app.backend)
        .await;

    app.add_product(1, "50.00", 1).await;

    let response = app.post("/cart/coupon", &json!({ "code": "OLD" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Coupon has expired");

    let cart = app.get("/cart").await;
    assert!(cart.data().get("coupon").is_none());
}

#[tokio::test]
async fn test_coupon_needs_code_and_items() {
    let app = TestApp::start().await;

    Mock::given(method("POST"))
        .and(path("/coupons/apply"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let blank = app.post("/cart/coupon", &json!({ "code": "  " })).await;
    assert_eq!(blank.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(blank.data()["code"], "Coupon code is required");

    let empty_cart = app.post("/cart/coupon", &json!({ "code": "SPRING20" })).await;
    assert_eq!(empty_cart.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shipping_adds_to_total() {
    let app = TestApp::start().await;
    mount_get(&app.backend, "/shipping-methods", shipping_methods()).await;

    app.add_product(1, "40.00", 1).await;

    let response = app
        .json(
            Method::PUT,
            "/cart/shipping",
            &json!({ "shipping_method_id": "express" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["shipping"]["name"], "Express");
    assert_eq!(dec(&response.data()["shipping_cost"]), d("19.99"));
    assert_eq!(dec(&response.data()["total"]), d("59.99"));

    let unknown = app
        .json(
            Method::PUT,
            "/cart/shipping",
            &json!({ "shipping_method_id": "teleport" }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::start().await;

    app.add_product(1, "40.00", 1).await;
    let cleared = app.delete("/cart").await;

    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.data()["lines"].as_array().unwrap().is_empty());
}
