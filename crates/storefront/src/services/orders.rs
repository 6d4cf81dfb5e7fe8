//! Orders.
//!
//! The storefront only asks the backend to create and cancel orders; status,
//! totals and persistence are the backend's.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lensway_core::{
    Address, LineCustomization, OrderId, OrderStatus, PaymentMethodKind, PaymentStatus, ProductId,
    ShippingMethodId,
};

use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// An order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, alias = "orderNumber")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub totals: OrderTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether the account page should offer a cancel action.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        self.status.offers_cancel()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub customization: LineCustomization,
}

/// Order money breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    #[serde(default)]
    pub total: Decimal,
}

/// Card details entered at checkout. Never logged.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(default)]
    pub cardholder_name: String,
    #[serde(default)]
    pub card_number: String,
    /// `MM/YY`.
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub cvv: String,
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: String = self.card_number.chars().filter(char::is_ascii_digit).collect();
        let last4 = digits.get(digits.len().saturating_sub(4)..).unwrap_or_default();
        f.debug_struct("PaymentDetails")
            .field("cardholder_name", &self.cardholder_name)
            .field("card_number", &format!("****{last4}"))
            .field("expiry", &self.expiry)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub shipping_method_id: ShippingMethodId,
    pub payment_method: PaymentMethodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub totals: OrderTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Create an order.
///
/// # Errors
///
/// Returns the backend failure with its message verbatim.
#[instrument(skip_all, fields(items = request.items.len()))]
pub async fn create(api: &ApiClient, request: &OrderRequest) -> Result<Order, ApiError> {
    api.post(&Endpoint::Orders.path(), request, Auth::Required)
        .await
        .into_result()
}

/// List the customer's orders.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api))]
pub async fn list(api: &ApiClient) -> Result<Vec<Order>, ApiError> {
    Ok(api
        .get::<Vec<Order>>(&Endpoint::Orders.path(), Auth::Required)
        .await
        .into_optional()?
        .unwrap_or_default())
}

/// Fetch one order.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api), fields(order_id = %id))]
pub async fn get(api: &ApiClient, id: &OrderId) -> Result<Order, ApiError> {
    api.get(&Endpoint::Order(id).path(), Auth::Required)
        .await
        .into_result()
}

/// Ask the backend to cancel an order. Returns the updated order when the
/// backend sends one.
///
/// # Errors
///
/// Returns the backend failure (e.g. the order already shipped).
#[instrument(skip(api), fields(order_id = %id))]
pub async fn cancel(api: &ApiClient, id: &OrderId) -> Result<Option<Order>, ApiError> {
    api.post(
        &Endpoint::CancelOrder(id).path(),
        &serde_json::json!({}),
        Auth::Required,
    )
    .await
    .into_optional()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_details_debug_masks_card() {
        let details = PaymentDetails {
            cardholder_name: "Ada Lovelace".into(),
            card_number: "4242 4242 4242 4242".into(),
            expiry: "09/27".into(),
            cvv: "123".into(),
        };
        let debug = format!("{details:?}");
        assert!(debug.contains("****4242"));
        assert!(!debug.contains("4242 4242"));
        assert!(!debug.contains("123\""));
    }

    #[test]
    fn test_order_parses_unknown_status() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 9001,
            "orderNumber": "LW-9001",
            "status": "on_hold",
            "created_at": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.order_number.as_deref(), Some("LW-9001"));
        assert!(!order.can_cancel());
    }
}
