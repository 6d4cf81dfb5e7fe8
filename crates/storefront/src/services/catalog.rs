//! Product catalog.
//!
//! Products are read-only on this side. Listings and detail pages are cached
//! for 5 minutes; search queries bypass the cache.

use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use lensway_core::{CurrencyCode, Price, ProductId};

use super::cache::{CacheKey, CacheValue};
use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// A product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl Product {
    /// Product price in the store currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::USD)
    }

    /// First image, used as the cart thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Listing filters.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ProductQuery {
    /// Query string including the leading `?`, or empty.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(format!("page={page}"));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            params.push(format!("category={}", urlencoding::encode(category)));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(format!("search={}", urlencoding::encode(search)));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }

    fn is_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default, alias = "totalPages")]
    pub pages: u32,
}

/// A page of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// The backend answers listings either paginated or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListBody {
    Page(ProductPage),
    List(Vec<Product>),
}

impl From<ProductListBody> for ProductPage {
    fn from(body: ProductListBody) -> Self {
        match body {
            ProductListBody::Page(page) => page,
            ProductListBody::List(products) => Self {
                products,
                pagination: None,
            },
        }
    }
}

/// Cached access to the product catalog.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { api, cache }
    }

    /// List products.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = CacheKey::Products(query.clone());

        if !query.is_search()
            && let Some(CacheValue::Products(page)) = self.cache.get(&cache_key).await
        {
            debug!("Cache hit for product listing");
            return Ok(page);
        }

        let path = format!("{}{}", Endpoint::Products.path(), query.to_query_string());
        let page: ProductPage = self
            .api
            .get::<ProductListBody>(&path, Auth::Public)
            .await
            .into_result()?
            .into();

        if !query.is_search() {
            self.cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns the backend failure (404 passes through as a status error).
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .api
            .get(&Endpoint::Product(id).path(), Auth::Public)
            .await
            .into_result()?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}
