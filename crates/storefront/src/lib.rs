//! Lensway Storefront library.
//!
//! Request-orchestration layer between the storefront clients and the
//! Lensway commerce backend. The library holds everything the binary serves,
//! so it can be driven directly from tests with [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod customize;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod wizard;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;

use state::AppState;

/// The full router with sessions, tracing and the body limit applied.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes;
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_request_span))
        .with_state(state)
}
