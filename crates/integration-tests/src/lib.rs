//! Integration tests for Lensway.
//!
//! The storefront router is driven in-process with `tower::ServiceExt::oneshot`
//! against a `wiremock` server standing in for the commerce backend. No
//! network services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lensway-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - Token attachment, refresh and normalization
//! - `cart_flow` - Session cart, coupons and shipping
//! - `checkout` - Guest redirect, validation, order placement
//! - `lens_wizard` - Lens catalog fan-out and customization wizard
//! - `forms` - Lead-capture forms, uploads and the pricing wizard
//! - `router` - Health, request ids, auth gates

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Mutex;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lensway_storefront::config::StorefrontConfig;
use lensway_storefront::state::AppState;

/// Storefront router wired to a mock backend, with a one-cookie jar.
pub struct TestApp {
    pub backend: MockServer,
    router: Router,
    cookie: Mutex<Option<String>>,
}

/// Status and parsed JSON body of a storefront response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `data` of the envelope.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Start a mock backend and build the storefront against it.
    pub async fn start() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::start`], adjusting the config first.
    pub async fn with_config(adjust: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let backend = MockServer::start().await;

        let mut config = StorefrontConfig {
            api_base_url: backend.uri(),
            ..StorefrontConfig::default()
        };
        adjust(&mut config);

        let router = lensway_storefront::app(AppState::new(config));

        Self {
            backend,
            router,
            cookie: Mutex::new(None),
        }
    }

    /// Send a request, carrying the session cookie across calls.
    pub async fn send(&self, mut request: Request<Body>) -> TestResponse {
        let cookie = self.cookie.lock().unwrap().clone();
        if let Some(cookie) = cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            *self.cookie.lock().unwrap() = Some(pair);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, body: &Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.json(Method::POST, uri, body).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(
            Request::delete(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Put frame `id` in the catalog at `price` and add `quantity` to the cart.
    pub async fn add_product(&self, id: u64, price: &str, quantity: u32) -> TestResponse {
        mount_get(&self.backend, &format!("/products/{id}"), frame_product(id, price)).await;
        self.post("/cart/items", &plain_line(&id.to_string(), quantity))
            .await
    }

    /// Log in as a fixed customer; the backend issues `access-1`/`refresh-1`.
    pub async fn login(&self) -> TestResponse {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "access_token": "access-1",
                    "refresh_token": "refresh-1",
                    "user": {
                        "id": 42,
                        "email": "ada@example.com",
                        "first_name": "Ada",
                        "last_name": "Lovelace"
                    }
                }
            })))
            .mount(&self.backend)
            .await;

        let response = self
            .post(
                "/auth/login",
                &json!({ "email": "ada@example.com", "password": "hunter22" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {response:?}");
        response
    }
}

/// Backend envelope around `data`.
#[must_use]
pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// Mount `GET path` answering with an envelope around `data`.
pub async fn mount_get(backend: &MockServer, route: &str, data: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(data)))
        .mount(backend)
        .await;
}

/// A frame product as the backend returns it.
#[must_use]
pub fn frame_product(id: u64, price: &str) -> Value {
    json!({
        "id": id,
        "name": "Aviator Classic",
        "price": price,
        "images": ["https://cdn.lensway.test/aviator.jpg"],
        "category": "eyeglasses"
    })
}

/// Body for `POST /cart/items` with a plain product.
#[must_use]
pub fn plain_line(product_id: &str, quantity: u32) -> Value {
    json!({ "product_id": product_id, "quantity": quantity })
}

/// A complete, valid checkout body paying by card.
#[must_use]
pub fn checkout_form() -> Value {
    json!({
        "email": "ada@example.com",
        "phone": "+1 555 123 4567",
        "shipping_address": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "line1": "12 Analytical Way",
            "city": "Portland",
            "state": "OR",
            "zip_code": "97201",
            "country": "US"
        },
        "shipping_method_id": "standard",
        "payment_method": "card",
        "payment": {
            "cardholder_name": "Ada Lovelace",
            "card_number": "4242424242424242",
            "expiry": "12/29",
            "cvv": "123"
        }
    })
}

/// Shipping methods the backend offers.
#[must_use]
pub fn shipping_methods() -> Value {
    json!([
        { "id": "standard", "name": "Standard", "price": "5.99", "estimated_days": 5 },
        { "id": "express", "name": "Express", "price": "19.99", "estimated_days": 2 }
    ])
}
