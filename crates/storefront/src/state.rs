//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::services::{CatalogService, FormService};

/// Application state shared across all handlers.
///
/// Cheap to clone. Holds no per-visitor data; carts, tokens and wizard
/// progress live in the session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    catalog: CatalogService,
    forms: FormService,
}

impl AppState {
    /// Create a new application state talking to `config.api_base_url`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let api = ApiClient::new(config.api_base_url.clone());
        Self::with_api(config, api)
    }

    /// Create state around an existing client.
    #[must_use]
    pub fn with_api(config: StorefrontConfig, api: ApiClient) -> Self {
        let catalog = CatalogService::new(api.clone());
        let forms = FormService::new(api.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                catalog,
                forms,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Client without visitor tokens. Use [`crate::middleware::SessionApi`]
    /// for calls on behalf of the visitor.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn forms(&self) -> &FormService {
        &self.inner.forms
    }
}
