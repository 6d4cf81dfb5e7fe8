//! Coupon application.
//!
//! The backend computes discounts. The storefront sends the code with the
//! current subtotal and lines and stores the answer verbatim.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lensway_core::ProductId;

use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// Body of `POST /coupons/apply`.
#[derive(Debug, Clone, Serialize)]
pub struct CouponRequest {
    pub code: String,
    pub subtotal: Decimal,
    pub items: Vec<CouponItem>,
}

/// A cart line as seen by coupon rules.
#[derive(Debug, Clone, Serialize)]
pub struct CouponItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// Backend-computed discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponDiscount {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(alias = "discountAmount", alias = "discount")]
    pub discount_amount: Decimal,
    #[serde(alias = "finalTotal")]
    pub final_total: Decimal,
}

/// Ask the backend to price a coupon against the cart.
///
/// # Errors
///
/// Returns the backend failure; an invalid or expired code surfaces with the
/// backend's own message.
#[instrument(skip(api, request), fields(code = %request.code))]
pub async fn apply(api: &ApiClient, request: &CouponRequest) -> Result<CouponDiscount, ApiError> {
    api.post(&Endpoint::ApplyCoupon.path(), request, Auth::Required)
        .await
        .into_result()
}
