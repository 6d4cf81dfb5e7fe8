//! Session models for storefront.

pub mod session;

pub use session::{CurrentCustomer, StoredTokens, keys as session_keys};
