//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `LENSWAY_ENV` - `production` selects the production backend
//! - `LENSWAY_API_URL` - Backend base URL, overrides `LENSWAY_ENV`
//! - `STOREFRONT_MAX_UPLOAD_BYTES` - Request body ceiling (default: 10 MiB)
//! - `CHECKOUT_LOGIN_REDIRECT_MS` - Delay before guests are sent to login (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

/// Production backend.
pub const PRODUCTION_API_URL: &str = "https://api.lensway.com/api";

/// Local development backend.
pub const DEVELOPMENT_API_URL: &str = "http://localhost:5000/api";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Backend REST API base URL, without trailing slash
    pub api_base_url: String,
    /// Largest accepted request body, multipart uploads included
    pub max_upload_bytes: usize,
    /// How long the client waits before following the guest checkout redirect
    pub checkout_login_redirect_ms: u64,
    pub sentry: SentryConfig,
}

#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("STOREFRONT_PORT", 3000)?;
        let base_url = env.or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        check_url("STOREFRONT_BASE_URL", &base_url)?;
        let api_base_url = resolve_api_url(
            env.optional("LENSWAY_API_URL").as_deref(),
            env.optional("LENSWAY_ENV").as_deref(),
        );
        check_url("LENSWAY_API_URL", &api_base_url)?;
        let max_upload_bytes = env.parse_or("STOREFRONT_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let checkout_login_redirect_ms = env.parse_or("CHECKOUT_LOGIN_REDIRECT_MS", 2000)?;

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.rate_or("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: env.rate_or("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            api_base_url,
            max_upload_bytes,
            checkout_login_redirect_ms,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api_base_url: DEVELOPMENT_API_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            checkout_login_redirect_ms: 2000,
            sentry: SentryConfig {
                dsn: None,
                environment: None,
                sample_rate: 1.0,
                traces_sample_rate: 0.1,
            },
        }
    }
}

/// Backend base URL: explicit override, else by environment.
#[must_use]
pub fn resolve_api_url(explicit: Option<&str>, environment: Option<&str>) -> String {
    if let Some(url) = explicit.map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }
    match environment {
        Some(env) if env.eq_ignore_ascii_case("production") => PRODUCTION_API_URL.to_string(),
        _ => DEVELOPMENT_API_URL.to_string(),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Only absolute http(s) URLs are accepted.
fn check_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {scheme}"),
        )),
    }
}

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse a sample rate in `0.0..=1.0`.
    fn rate_or(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let rate = self.parse_or(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ))
        }
    }
}
