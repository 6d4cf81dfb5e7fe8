//! Typed wrappers over the backend API, one per resource group.
//!
//! # Services
//!
//! - `auth` - Login, registration, logout, current customer
//! - `catalog` - Products (cached)
//! - `cart` - Backend cart of an authenticated customer
//! - `coupons` - Backend-computed coupon discounts
//! - `forms` - Lead-capture and support forms (schemas cached)
//! - `lens` - Lens catalog, loaded concurrently
//! - `orders` - Order creation, history and cancellation
//! - `payments` - Payment methods
//! - `prescriptions` - Customer prescriptions
//! - `shipping` - Shipping methods

pub mod auth;
pub mod cache;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod forms;
pub mod lens;
pub mod orders;
pub mod payments;
pub mod prescriptions;
pub mod shipping;

pub use catalog::CatalogService;
pub use forms::FormService;
