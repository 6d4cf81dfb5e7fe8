//! Postal address used for shipping and billing.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Saved-address id, when the address came from the customer's book.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

fn default_country() -> String {
    "US".to_owned()
}

impl Address {
    /// Look up a field by name, as used by declarative validation tables.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "first_name" => Some(&self.first_name),
            "last_name" => Some(&self.last_name),
            "line1" => Some(&self.line1),
            "line2" => self.line2.as_deref(),
            "city" => Some(&self.city),
            "state" => Some(&self.state),
            "zip_code" => Some(&self.zip_code),
            "country" => Some(&self.country),
            "phone" => self.phone.as_deref(),
            _ => None,
        }
    }
}
