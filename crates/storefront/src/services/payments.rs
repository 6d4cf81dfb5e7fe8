//! Payment methods offered at checkout.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use lensway_core::{PaymentMethodId, PaymentMethodKind};

use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// A payment method the backend accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    #[serde(rename = "type", default)]
    pub kind: PaymentMethodKind,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const fn enabled_by_default() -> bool {
    true
}

/// List enabled payment methods.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api))]
pub async fn list(api: &ApiClient) -> Result<Vec<PaymentMethod>, ApiError> {
    let methods: Vec<PaymentMethod> = api
        .get(&Endpoint::PaymentMethods.path(), Auth::Required)
        .await
        .into_result()?;

    Ok(methods.into_iter().filter(|m| m.enabled).collect())
}
