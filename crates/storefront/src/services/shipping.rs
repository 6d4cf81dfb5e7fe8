//! Shipping methods offered at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lensway_core::ShippingMethodId;

use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// A shipping method as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    /// Estimated delivery time in business days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_days: Option<u32>,
    /// Free-form delivery estimate, e.g. "3-5 business days".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// List available shipping methods.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api))]
pub async fn list(api: &ApiClient) -> Result<Vec<ShippingMethod>, ApiError> {
    api.get(&Endpoint::ShippingMethods.path(), Auth::Public)
        .await
        .into_result()
}

/// Find a method by id.
///
/// # Errors
///
/// Returns the backend failure, or a 404 status error when the id is unknown.
pub async fn find(api: &ApiClient, id: &ShippingMethodId) -> Result<ShippingMethod, ApiError> {
    list(api)
        .await?
        .into_iter()
        .find(|m| &m.id == id)
        .ok_or_else(|| ApiError::Status {
            status: 404,
            message: format!("Shipping method {id} is not available"),
        })
}
