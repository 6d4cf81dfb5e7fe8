//! Lens customization wizard.
//!
//! The visitor picks a lens type, then lens options (index, coating,
//! treatments), then reviews. The in-progress customization lives in the
//! session; prices always come from the loaded [`LensCatalog`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;
use tracing::warn;

use lensway_core::{
    LensOptionId, LensTypeId, LineCustomization, PrescriptionId, ProductId, TreatmentId,
};

use crate::cart::NewCartLine;
use crate::models::session_keys;
use crate::services::catalog::Product;
use crate::services::lens::{LensCatalog, LensOptionKind};
use crate::wizard::{LensStep, Wizard};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CustomizeError {
    #[error("No lens customization in progress")]
    NotStarted,

    #[error("Please make a selection for the {0:?} step")]
    SelectionRequired(LensStep),

    #[error("Unknown {kind}: {id}")]
    UnknownSelection { kind: &'static str, id: String },

    #[error("Review your lenses before adding them to the cart")]
    NotAtReview,
}

/// Choices submitted with a "next" action. Only the fields of the current
/// step are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LensSelection {
    #[serde(default)]
    pub lens_type: Option<LensTypeId>,
    #[serde(default)]
    pub lens_index: Option<LensOptionId>,
    #[serde(default)]
    pub coating: Option<LensOptionId>,
    #[serde(default)]
    pub treatments: Vec<TreatmentId>,
    #[serde(default)]
    pub prescription_id: Option<PrescriptionId>,
}

/// In-progress customization of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensCustomization {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub frame_price: Decimal,
    step: usize,
    #[serde(default)]
    pub lens_type: Option<LensTypeId>,
    #[serde(default)]
    pub lens_index: Option<LensOptionId>,
    #[serde(default)]
    pub coating: Option<LensOptionId>,
    #[serde(default)]
    pub treatments: Vec<TreatmentId>,
    #[serde(default)]
    pub prescription_id: Option<PrescriptionId>,
}

/// Wizard state as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct CustomizationView {
    pub step: LensStep,
    pub step_index: usize,
    pub step_count: usize,
    pub customization: LensCustomization,
    pub price: Decimal,
}

impl LensCustomization {
    /// Begin customizing `product` at the first step.
    #[must_use]
    pub fn start(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_image: product.primary_image().map(String::from),
            frame_price: product.price,
            step: 0,
            lens_type: None,
            lens_index: None,
            coating: None,
            treatments: Vec::new(),
            prescription_id: None,
        }
    }

    fn wizard(&self) -> Wizard<LensStep> {
        Wizard::at(self.step)
    }

    #[must_use]
    pub fn step(&self) -> LensStep {
        self.wizard().current()
    }

    /// Record the current step's selection and move forward.
    ///
    /// # Errors
    ///
    /// Fails when the step's selection is missing or names something the
    /// catalog does not have, or when already at review.
    pub fn advance(
        &mut self,
        selection: LensSelection,
        catalog: &LensCatalog,
    ) -> Result<LensStep, CustomizeError> {
        let mut wizard = self.wizard();

        match wizard.current() {
            LensStep::LensType => {
                let lens_type = selection
                    .lens_type
                    .or_else(|| self.lens_type.clone())
                    .ok_or(CustomizeError::SelectionRequired(LensStep::LensType))?;
                if catalog.lens_type(&lens_type).is_none() {
                    return Err(unknown("lens type", &lens_type));
                }
                self.lens_type = Some(lens_type);
            }
            LensStep::LensOptions => {
                let lens_index = selection
                    .lens_index
                    .or_else(|| self.lens_index.clone())
                    .ok_or(CustomizeError::SelectionRequired(LensStep::LensOptions))?;
                check_option(catalog, &lens_index, LensOptionKind::Index, "lens index")?;
                if let Some(coating) = &selection.coating {
                    check_option(catalog, coating, LensOptionKind::Coating, "coating")?;
                }
                if let Some(missing) = selection
                    .treatments
                    .iter()
                    .find(|t| catalog.treatment(t).is_none())
                {
                    return Err(unknown("treatment", missing));
                }
                self.lens_index = Some(lens_index);
                self.coating = selection.coating;
                self.treatments = selection.treatments;
                if selection.prescription_id.is_some() {
                    self.prescription_id = selection.prescription_id;
                }
            }
            LensStep::Review => return Err(CustomizeError::NotAtReview),
        }

        wizard.advance();
        self.step = wizard.index();
        Ok(wizard.current())
    }

    /// Step back, keeping earlier selections.
    pub fn back(&mut self) -> LensStep {
        let mut wizard = self.wizard();
        wizard.back();
        self.step = wizard.index();
        wizard.current()
    }

    /// Frame price plus every selected lens price.
    #[must_use]
    pub fn price(&self, catalog: &LensCatalog) -> Decimal {
        let lens_type = self
            .lens_type
            .as_ref()
            .and_then(|id| catalog.lens_type(id))
            .map(|t| t.price);
        let options = [&self.lens_index, &self.coating]
            .into_iter()
            .flatten()
            .filter_map(|id| catalog.option(id))
            .map(|o| o.price);
        let treatments = self
            .treatments
            .iter()
            .filter_map(|id| catalog.treatment(id))
            .map(|t| t.price);

        self.frame_price
            + lens_type.into_iter().chain(options).chain(treatments).sum::<Decimal>()
    }

    #[must_use]
    pub fn view(&self, catalog: &LensCatalog) -> CustomizationView {
        let wizard = self.wizard();
        CustomizationView {
            step: wizard.current(),
            step_index: wizard.index(),
            step_count: wizard.step_count(),
            customization: self.clone(),
            price: self.price(catalog),
        }
    }

    /// The configured frame as a cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizeError::NotAtReview`] before the review step.
    pub fn complete(&self, catalog: &LensCatalog) -> Result<NewCartLine, CustomizeError> {
        if self.step() != LensStep::Review {
            return Err(CustomizeError::NotAtReview);
        }
        let lens_type = self
            .lens_type
            .clone()
            .ok_or(CustomizeError::SelectionRequired(LensStep::LensType))?;

        Ok(NewCartLine {
            product_id: self.product_id.clone(),
            name: self.product_name.clone(),
            image: self.product_image.clone(),
            unit_price: self.price(catalog),
            quantity: 1,
            customization: LineCustomization::Eyeglasses {
                lens_type,
                lens_index: self.lens_index.clone(),
                coating: self.coating.clone(),
                treatments: self.treatments.clone(),
                prescription_id: self.prescription_id.clone(),
            },
        })
    }
}

fn unknown(kind: &'static str, id: &impl std::fmt::Display) -> CustomizeError {
    CustomizeError::UnknownSelection {
        kind,
        id: id.to_string(),
    }
}

fn check_option(
    catalog: &LensCatalog,
    id: &LensOptionId,
    kind: LensOptionKind,
    label: &'static str,
) -> Result<(), CustomizeError> {
    match catalog.option(id) {
        Some(option) if option.kind == kind => Ok(()),
        _ => Err(unknown(label, id)),
    }
}

/// Load the in-progress customization, if any.
pub async fn load(session: &Session) -> Option<LensCustomization> {
    match session
        .get::<LensCustomization>(session_keys::LENS_CUSTOMIZATION)
        .await
    {
        Ok(customization) => customization,
        Err(e) => {
            warn!(error = %e, "Failed to load lens customization from session");
            None
        }
    }
}

/// Persist the in-progress customization.
///
/// # Errors
///
/// Returns the session store error.
pub async fn save(
    session: &Session,
    customization: &LensCustomization,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::LENS_CUSTOMIZATION, customization)
        .await
}

/// Drop the in-progress customization.
pub async fn clear(session: &Session) {
    if let Err(e) = session
        .remove::<LensCustomization>(session_keys::LENS_CUSTOMIZATION)
        .await
    {
        warn!(error = %e, "Failed to clear lens customization from session");
    }
}
