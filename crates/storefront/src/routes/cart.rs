//! Cart route handlers.
//!
//! The cart lives in the session. Every mutation loads it, applies one
//! [`CartState`] operation and saves it back before responding with the
//! fresh summary.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use lensway_core::{
    CartItemId, LineCustomization, ProductId, ShippingMethodId, ValidationErrors, ValidationRule,
};

use super::{ApiJson, ok};
use crate::cart::{CartState, CartSummary, NewCartLine, load_cart, save_cart};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::SessionApi;
use crate::services::{coupons, shipping};
use crate::state::AppState;

/// Body of `POST /cart/items`. Name and price are looked up, not sent.
#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub customization: LineCustomization,
}

const fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ShippingSelection {
    pub shipping_method_id: ShippingMethodId,
}

async fn respond(session: &Session, cart: &CartState) -> Result<ApiJson<CartSummary>> {
    save_cart(session, cart).await?;
    Ok(ok(cart.summary()))
}

/// Cart with totals.
pub async fn show(session: Session) -> ApiJson<CartSummary> {
    ok(load_cart(&session).await.summary())
}

/// Add a catalog product, merging with an equal line.
///
/// Frames with prescription lenses go through the lens wizard, which prices
/// the lenses.
#[instrument(skip(state, session, item), fields(product_id = %item.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(item): Json<AddItem>,
) -> Result<ApiJson<CartSummary>> {
    if matches!(item.customization, LineCustomization::Eyeglasses { .. }) {
        return Err(AppError::BadRequest(
            "Prescription lenses are added through the lens wizard".to_string(),
        ));
    }

    let product = state.catalog().get(&item.product_id).await?;

    let mut cart = load_cart(&session).await;
    cart.add(NewCartLine::for_product(&product, item.quantity, item.customization))?;
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product.id.as_str())]));
    respond(&session, &cart).await
}

/// Set a line's quantity.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(line_id): Path<String>,
    Json(update): Json<QuantityUpdate>,
) -> Result<ApiJson<CartSummary>> {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(&CartItemId::new(line_id), update.quantity)?;
    respond(&session, &cart).await
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(line_id): Path<String>) -> Result<ApiJson<CartSummary>> {
    let mut cart = load_cart(&session).await;
    cart.remove(&CartItemId::new(line_id))?;
    respond(&session, &cart).await
}

/// Empty the cart.
pub async fn clear(session: Session) -> Result<ApiJson<CartSummary>> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    respond(&session, &cart).await
}

/// Ask the backend to price a coupon and store its answer.
#[instrument(skip(session, api, form), fields(code = %form.code))]
pub async fn apply_coupon(
    session: Session,
    SessionApi(api): SessionApi,
    Json(form): Json<CouponForm>,
) -> Result<ApiJson<CartSummary>> {
    let mut errors = ValidationErrors::new();
    errors.check("code", "Coupon code", &ValidationRule::required(), Some(&form.code));
    errors.into_result()?;

    let mut cart = load_cart(&session).await;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    let discount = coupons::apply(&api, &cart.coupon_request(&form.code)).await?;
    cart.apply_coupon(&form.code, discount);
    respond(&session, &cart).await
}

/// Drop the coupon and revert to the local subtotal.
pub async fn remove_coupon(session: Session) -> Result<ApiJson<CartSummary>> {
    let mut cart = load_cart(&session).await;
    cart.remove_coupon();
    respond(&session, &cart).await
}

/// Select a shipping method from the backend's list.
#[instrument(skip(state, session))]
pub async fn select_shipping(
    State(state): State<AppState>,
    session: Session,
    Json(selection): Json<ShippingSelection>,
) -> Result<ApiJson<CartSummary>> {
    let method = shipping::find(state.api(), &selection.shipping_method_id).await?;
    let mut cart = load_cart(&session).await;
    cart.select_shipping(method);
    respond(&session, &cart).await
}
