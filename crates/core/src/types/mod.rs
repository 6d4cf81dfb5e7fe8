//! Core types for Lensway.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod form;
pub mod id;
pub mod lens;
pub mod prescription;
pub mod price;
pub mod status;
pub mod validation;

pub use address::Address;
pub use form::{Attachment, FieldKind, FormConfig, FormField, FormKind, FormSubmission, SelectOption};
pub use id::*;
pub use lens::{ContactLensEye, LineCustomization};
pub use prescription::{EyePrescription, Prescription, PupillaryDistance};
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use validation::{FieldError, ValidationErrors, ValidationRule};
