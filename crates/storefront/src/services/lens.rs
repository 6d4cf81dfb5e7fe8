//! Lens catalog: treatments, lens options, prescription lens types, shipping.
//!
//! The four slices are loaded concurrently. Each runs in its own task with a
//! child of one cancellation token; the first failure (or dropping the loading
//! future) cancels the rest.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use lensway_core::{LensOptionId, LensTypeId, TreatmentId};

use super::shipping::ShippingMethod;
use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// Lens treatment (blue-light filter, anti-glare, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensTreatment {
    pub id: TreatmentId,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What a [`LensOption`] configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LensOptionKind {
    Index,
    Coating,
    #[serde(other)]
    Other,
}

/// Lens index or coating option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensOption {
    pub id: LensOptionId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LensOptionKind,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Variant of a prescription lens type (e.g. progressive tiers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensTypeVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Decimal,
}

/// Prescription lens type (single vision, progressive, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensType {
    pub id: LensTypeId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<LensTypeVariant>,
}

/// Everything the lens customization wizard needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensCatalog {
    pub treatments: Vec<LensTreatment>,
    pub options: Vec<LensOption>,
    pub lens_types: Vec<LensType>,
    pub shipping_methods: Vec<ShippingMethod>,
}

impl LensCatalog {
    /// Load all slices concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first slice failure; the remaining slices are cancelled.
    #[instrument(skip(api))]
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        let token = CancellationToken::new();
        let _guard = token.clone().drop_guard();

        let treatments = spawn_slice(api, &token, Endpoint::LensTreatments.path());
        let options = spawn_slice(api, &token, Endpoint::LensOptions.path());
        let lens_types = spawn_slice(api, &token, Endpoint::PrescriptionLensTypes.path());
        let shipping_methods = spawn_slice(api, &token, Endpoint::ShippingMethods.path());

        let (treatments, options, lens_types, shipping_methods) = tokio::try_join!(
            join_slice(treatments),
            join_slice(options),
            join_slice(lens_types),
            join_slice(shipping_methods),
        )?;

        Ok(Self {
            treatments,
            options,
            lens_types,
            shipping_methods,
        })
    }

    #[must_use]
    pub fn lens_type(&self, id: &LensTypeId) -> Option<&LensType> {
        self.lens_types.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn option(&self, id: &LensOptionId) -> Option<&LensOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    #[must_use]
    pub fn treatment(&self, id: &TreatmentId) -> Option<&LensTreatment> {
        self.treatments.iter().find(|t| &t.id == id)
    }

    /// Options of one kind, in backend order.
    pub fn options_of(&self, kind: LensOptionKind) -> impl Iterator<Item = &LensOption> {
        self.options.iter().filter(move |o| o.kind == kind)
    }
}

fn spawn_slice<T>(
    api: &ApiClient,
    token: &CancellationToken,
    path: String,
) -> JoinHandle<Result<Vec<T>, ApiError>>
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    let client = api.clone().with_cancellation(token.child_token());
    tokio::spawn(async move {
        Ok(client
            .get::<Vec<T>>(&path, Auth::Public)
            .await
            .into_optional()?
            .unwrap_or_default())
    })
}

async fn join_slice<T>(handle: JoinHandle<Result<T, ApiError>>) -> Result<T, ApiError> {
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Lens catalog task failed");
            Err(ApiError::Network(e.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_option_kind_tolerates_unknown() {
        let option: LensOption = serde_json::from_value(serde_json::json!({
            "id": 4, "name": "Polarized", "type": "tint", "price": "25.00"
        }))
        .unwrap();
        assert_eq!(option.kind, LensOptionKind::Other);
        assert_eq!(option.id.as_str(), "4");
    }

    #[test]
    fn test_lookup_helpers() {
        let catalog = LensCatalog {
            options: vec![
                LensOption {
                    id: LensOptionId::new("1.67"),
                    name: "High index 1.67".into(),
                    kind: LensOptionKind::Index,
                    price: Decimal::new(6000, 2),
                    description: None,
                },
                LensOption {
                    id: LensOptionId::new("ar"),
                    name: "Anti-reflective".into(),
                    kind: LensOptionKind::Coating,
                    price: Decimal::new(3000, 2),
                    description: None,
                },
            ],
            ..LensCatalog::default()
        };

        assert_eq!(catalog.options_of(LensOptionKind::Coating).count(), 1);
        assert!(catalog.option(&LensOptionId::new("ar")).is_some());
        assert!(catalog.option(&LensOptionId::new("missing")).is_none());
    }
}
