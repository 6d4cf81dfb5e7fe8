//! Session-related types.
//!
//! Types stored in the visitor's session for authentication state.

use serde::{Deserialize, Serialize};

use lensway_core::UserId;

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the logged-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Backend customer ID.
    pub id: UserId,
    /// Customer's email address.
    pub email: String,
    /// Display name, if the backend supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Bearer tokens as persisted in the session.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the backend bearer tokens.
    pub const TOKENS: &str = "api_tokens";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the lens customization wizard in progress.
    pub const LENS_CUSTOMIZATION: &str = "lens_customization";
}
