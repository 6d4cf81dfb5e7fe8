//! Lensway Core - Shared types library.
//!
//! This crate provides common types used across all Lensway components:
//! - `storefront` - Request-orchestration layer in front of the commerce backend
//! - `cli` - Command-line tools for seeding reference data
//!
//! # Architecture
//!
//! The core crate contains only types and validation logic - no I/O, no HTTP
//! clients. All authoritative business rules (pricing, inventory, coupons)
//! live in the backend; these types mirror its shapes.
//!
//! # Modules
//!
//! - [`types`] - Opaque IDs, prices, statuses, prescriptions, lens
//!   customizations, form schemas and the validation-rule engine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
