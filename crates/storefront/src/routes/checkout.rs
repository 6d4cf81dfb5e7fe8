//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use super::ApiJson;
use crate::api::ApiResponse;
use crate::cart::{CartState, load_cart, save_cart};
use crate::checkout::{self, CheckoutForm};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, SessionApi};
use crate::services::orders::Order;
use crate::state::AppState;

/// Validate the checkout form and place the order. Clears the cart on
/// success.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    OptionalAuth(customer): OptionalAuth,
    SessionApi(api): SessionApi,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, ApiJson<Order>)> {
    let cart = load_cart(&session).await;

    let order = checkout::submit(&api, customer.as_ref(), &cart, &form)
        .await
        .map_err(|e| AppError::checkout(e, state.config().checkout_login_redirect_ms))?;

    save_cart(&session, &CartState::default()).await?;
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order.id.as_str())]));

    let message = order
        .order_number
        .as_ref()
        .map(|n| format!("Order {n} placed"));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(order).with_message(message)),
    ))
}
