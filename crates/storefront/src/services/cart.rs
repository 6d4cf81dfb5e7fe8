//! Backend cart of an authenticated customer.
//!
//! The session cart in [`crate::cart`] is what checkout submits. This is the
//! backend's authoritative copy, shown on the account page.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lensway_core::{CartItemId, LineCustomization, ProductId};

use crate::api::{ApiClient, ApiError, Auth, Endpoint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendCartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub customization: LineCustomization,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendCart {
    #[serde(default)]
    pub items: Vec<BackendCartItem>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub total: Option<Decimal>,
}

/// Fetch the customer's backend cart. An empty body means an empty cart.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api))]
pub async fn fetch(api: &ApiClient) -> Result<BackendCart, ApiError> {
    Ok(api
        .get::<BackendCart>(&Endpoint::Cart.path(), Auth::Required)
        .await
        .into_optional()?
        .unwrap_or_default())
}
