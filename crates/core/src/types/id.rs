//! Newtype IDs for type-safe entity references.
//!
//! Backend identifiers are opaque: the storefront never inspects them, it only
//! round-trips them. Use the `define_id!` macro to create wrappers that keep
//! IDs of different entity types from being mixed up.

use serde::{Deserialize, Deserializer};

/// Macro to define a type-safe opaque ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string
/// - `Deserialize` from either a JSON string or a JSON integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use lensway_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget = WidgetId::new("w-1");
/// let gadget = GadgetId::new("w-1");
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget;
/// # let _ = (widget, gadget);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_opaque(deserializer).map(Self)
            }
        }

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Deserialize an opaque identifier from a JSON string or integer.
///
/// Used by `define_id!`; not intended to be called directly.
///
/// # Errors
///
/// Returns an error if the value is neither a string nor an integer.
#[doc(hidden)]
pub fn deserialize_opaque<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(CartItemId);
define_id!(PrescriptionId);
define_id!(AddressId);
define_id!(ShippingMethodId);
define_id!(PaymentMethodId);
define_id!(LensTypeId);
define_id!(LensOptionId);
define_id!(TreatmentId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_string() {
        let id: ProductId = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_deserialize_from_integer() {
        let id: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(id, OrderId::new("42"));
    }

    #[test]
    fn test_serialize_as_string() {
        let id = PrescriptionId::new("7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<UserId>("{\"id\": 1}").is_err());
    }

    #[test]
    fn test_display() {
        let id = LensTypeId::new("progressive");
        assert_eq!(format!("{id}"), "progressive");
    }
}
