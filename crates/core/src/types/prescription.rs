//! Eyeglass prescription shapes.
//!
//! Optical values (sphere, cylinder, axis, add) are kept as the strings the
//! customer typed. No range checks are applied: the backend and the
//! dispensing optician own those rules.

use serde::{Deserialize, Serialize};

use super::id::PrescriptionId;
use super::validation::ValidationErrors;

/// Prescription values for one eye.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyePrescription {
    /// Sphere (SPH), e.g. "-2.25".
    #[serde(default)]
    pub sphere: String,
    /// Cylinder (CYL), e.g. "-0.75".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cylinder: Option<String>,
    /// Axis in degrees, e.g. "180".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
    /// Reading addition (ADD), e.g. "+2.00".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<String>,
}

/// Pupillary distance, either a single binocular value or one per eye.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupillaryDistance {
    /// Binocular PD in millimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single: Option<String>,
    /// Right eye (OD) monocular PD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    /// Left eye (OS) monocular PD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
}

impl PupillaryDistance {
    /// Whether a usable PD was supplied.
    #[must_use]
    pub fn is_present(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.single) || (filled(&self.right) && filled(&self.left))
    }
}

/// A customer's eyeglass prescription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    /// Backend id, absent until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PrescriptionId>,
    /// Customer-chosen label, e.g. "Reading glasses 2025".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Right eye (OD).
    #[serde(default)]
    pub od: EyePrescription,
    /// Left eye (OS).
    #[serde(default)]
    pub os: EyePrescription,
    #[serde(default)]
    pub pd: PupillaryDistance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_phone: Option<String>,
    /// Exam date as entered (typically YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<String>,
    /// Expiry date as entered (typically YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Prescription {
    /// Presence-only validation.
    ///
    /// # Errors
    ///
    /// Returns the missing fields: sphere for each eye and a PD.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.od.sphere.trim().is_empty() {
            errors.add("od.sphere", "Right eye (OD) sphere is required");
        }
        if self.os.sphere.trim().is_empty() {
            errors.add("os.sphere", "Left eye (OS) sphere is required");
        }
        if !self.pd.is_present() {
            errors.add("pd", "Pupillary distance is required");
        }

        errors.into_result()
    }
}
