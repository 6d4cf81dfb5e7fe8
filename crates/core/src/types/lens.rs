//! Lens customization attached to a cart line.

use serde::{Deserialize, Serialize};

use super::id::{LensOptionId, LensTypeId, PrescriptionId, TreatmentId};

/// Per-eye contact lens parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLensEye {
    /// Boxes ordered for this eye.
    pub quantity: u32,
    /// Power (PWR/SPH), e.g. "-3.50".
    pub power: String,
    /// Base curve (BC), e.g. "8.6".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_curve: Option<String>,
    /// Diameter (DIA), e.g. "14.2".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<String>,
    /// Toric cylinder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinder: Option<String>,
    /// Toric axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
    /// Multifocal addition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<String>,
}

/// How a cart line was configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineCustomization {
    /// Plain product (sunglasses, accessories, frames only).
    #[default]
    None,
    /// Frames with prescription lenses.
    Eyeglasses {
        lens_type: LensTypeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lens_index: Option<LensOptionId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        coating: Option<LensOptionId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        treatments: Vec<TreatmentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prescription_id: Option<PrescriptionId>,
    },
    /// Contact lenses, priced per box per eye.
    ContactLens {
        right: ContactLensEye,
        left: ContactLensEye,
    },
}

impl LineCustomization {
    /// Units priced for this line, given the line's own quantity.
    ///
    /// Contact lens lines price `right.quantity + left.quantity` boxes and
    /// ignore the line quantity.
    #[must_use]
    pub const fn priced_units(&self, line_quantity: u32) -> u32 {
        match self {
            Self::ContactLens { right, left } => right.quantity.saturating_add(left.quantity),
            Self::None | Self::Eyeglasses { .. } => line_quantity,
        }
    }

    /// Whether this is a contact lens configuration.
    #[must_use]
    pub const fn is_contact_lens(&self) -> bool {
        matches!(self, Self::ContactLens { .. })
    }
}
