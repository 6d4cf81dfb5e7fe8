//! Cache types for catalog responses.

use lensway_core::ProductId;

use super::catalog::{Product, ProductPage, ProductQuery};

/// Cache key for products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products(ProductQuery),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
}
