//! HTTP route handlers for storefront.
//!
//! Every response body is an [`ApiResponse`] envelope.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//!
//! # Catalog
//! GET    /products                        - Product list (page, limit, category, search)
//! GET    /products/{id}                   - Product detail
//!
//! # Cart (session)
//! GET    /cart                            - Cart with totals
//! DELETE /cart                            - Clear cart
//! POST   /cart/items                      - Add line
//! PATCH  /cart/items/{line_id}            - Set quantity
//! DELETE /cart/items/{line_id}            - Remove line
//! POST   /cart/coupon                     - Apply coupon
//! DELETE /cart/coupon                     - Remove coupon
//! PUT    /cart/shipping                   - Select shipping method
//!
//! # Checkout
//! POST   /checkout                        - Validate and place order
//!
//! # Lens customization
//! GET    /lens/catalog                    - Treatments, options, lens types, shipping
//! GET    /lens/customize                  - Wizard state
//! POST   /lens/customize/{product_id}     - Start wizard
//! POST   /lens/customize/next             - Advance with selection
//! POST   /lens/customize/back             - Step back
//! POST   /lens/customize/complete         - Add configured frame to cart
//!
//! # Forms
//! GET    /forms/{kind}/config             - Form schema
//! POST   /forms/{kind}                    - JSON submission
//! POST   /forms/{kind}/upload             - Multipart submission with attachments
//! POST   /forms/{kind}/step               - Validate one wizard step (pricing)
//!
//! # Auth
//! POST   /auth/login | /auth/register | /auth/logout
//! GET    /auth/me
//!
//! # Account (requires auth)
//! GET    /account/orders                  - Order history
//! GET    /account/orders/{id}             - Order detail
//! POST   /account/orders/{id}/cancel      - Cancel order
//! GET    /account/cart                    - Backend cart
//! GET    /account/prescriptions           - Prescriptions
//! POST   /account/prescriptions           - Create prescription
//! GET|PUT|DELETE /account/prescriptions/{id}
//! GET    /account/payment-methods         - Enabled payment methods
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod forms;
pub mod health;
pub mod lens;
pub mod products;

use axum::{
    Json, Router,
    routing::{get, patch, post, put},
};

use crate::api::ApiResponse;
use crate::state::AppState;

/// JSON envelope returned by every handler.
pub type ApiJson<T> = Json<ApiResponse<T>>;

/// Wrap data in a successful envelope.
pub const fn ok<T>(data: T) -> ApiJson<T> {
    Json(ApiResponse::ok(data))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{line_id}", patch(cart::update).delete(cart::remove))
        .route("/coupon", post(cart::apply_coupon).delete(cart::remove_coupon))
        .route("/shipping", put(cart::select_shipping))
}

/// Create the lens routes router.
pub fn lens_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(lens::catalog))
        .route("/customize", get(lens::show))
        .route("/customize/next", post(lens::next))
        .route("/customize/back", post(lens::back))
        .route("/customize/complete", post(lens::complete))
        .route("/customize/{product_id}", post(lens::start))
}

/// Create the form routes router.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/{kind}", post(forms::submit))
        .route("/{kind}/config", get(forms::config))
        .route("/{kind}/upload", post(forms::upload))
        .route("/{kind}/step", post(forms::step))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
        .route("/orders/{id}/cancel", post(account::cancel_order))
        .route("/cart", get(account::cart))
        .route(
            "/prescriptions",
            get(account::prescriptions).post(account::create_prescription),
        )
        .route(
            "/prescriptions/{id}",
            get(account::prescription)
                .put(account::update_prescription)
                .delete(account::delete_prescription),
        )
        .route("/payment-methods", get(account::payment_methods))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/checkout", post(checkout::submit))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/lens", lens_routes())
        .nest("/forms", form_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
}
