//! Declarative field validation.
//!
//! A [`ValidationRule`] is the uniform rule record shared by backend-driven
//! form schemas and the checkout field table. Rules check presence, a regex
//! pattern and length bounds, nothing more; all other invariants are the
//! backend's job.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation rule for a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// The field must be present and non-blank.
    #[serde(default)]
    pub required: bool,
    /// Regex the trimmed value must match (only checked when non-empty).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum length in characters of the trimmed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters of the trimmed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Message shown when the pattern does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    /// A rule that only requires presence.
    #[must_use]
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Add a pattern with its failure message.
    #[must_use]
    pub fn with_pattern(mut self, pattern: &str, message: &str) -> Self {
        self.pattern = Some(pattern.to_owned());
        self.message = Some(message.to_owned());
        self
    }

    /// Add length bounds.
    #[must_use]
    pub const fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Check a value against this rule.
    ///
    /// `label` is used to build human-readable messages.
    ///
    /// # Errors
    ///
    /// Returns the first failing check's message.
    pub fn check(&self, label: &str, value: Option<&str>) -> Result<(), String> {
        let value = value.map(str::trim).unwrap_or_default();

        if value.is_empty() {
            if self.required {
                return Err(format!("{label} is required"));
            }
            return Ok(());
        }

        let length = value.chars().count();
        if let Some(min) = self.min_length
            && length < min
        {
            return Err(format!("{label} must be at least {min} characters"));
        }
        if let Some(max) = self.max_length
            && length > max
        {
            return Err(format!("{label} must be at most {max} characters"));
        }

        if let Some(pattern) = &self.pattern {
            // An uncompilable pattern fails the field.
            let matches = Regex::new(pattern).is_ok_and(|re| re.is_match(value));
            if !matches {
                return Err(self
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("{label} is invalid")));
            }
        }

        Ok(())
    }
}

/// A single field's validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field identifier (dotted path for nested checkout fields).
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// Collected validation failures, keyed by field.
///
/// Serializes as a `{ field: message }` map, which is what forms render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. The first failure for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Check `value` against `rule` and record any failure under `field`.
    pub fn check(&mut self, field: &str, label: &str, rule: &ValidationRule, value: Option<&str>) {
        if let Err(message) = rule.check(label, value) {
            self.add(field, message);
        }
    }

    /// Whether no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Iterate failures in field order.
    pub fn iter(&self) -> impl Iterator<Item = FieldError> + '_ {
        self.0.iter().map(|(field, message)| FieldError {
            field: field.clone(),
            message: message.clone(),
        })
    }

    /// Convert into a `Result`, failing when any error was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if it is non-empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Commonly used patterns.
pub mod patterns {
    /// US ZIP or ZIP+4.
    pub const ZIP_CODE: &str = r"^[0-9]{5}(-[0-9]{4})?$";
    /// Loose email shape: something@something.tld.
    pub const EMAIL: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
    /// 13 to 19 digits, optionally grouped with spaces or dashes.
    pub const CARD_NUMBER: &str = r"^[0-9](?:[ -]?[0-9]){12,18}$";
    /// Card expiry as MM/YY.
    pub const CARD_EXPIRY: &str = r"^(0[1-9]|1[0-2])/[0-9]{2}$";
    /// Three or four digit security code.
    pub const CARD_CVV: &str = r"^[0-9]{3,4}$";
    /// Phone number characters.
    pub const PHONE: &str = r"^\+?[0-9()\-.\s]{7,20}$";
}
