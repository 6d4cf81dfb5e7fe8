//! Backend REST API client.
//!
//! # Architecture
//!
//! - One [`ApiClient`] wraps `reqwest` and knows the backend base URL
//! - [`Endpoint`] is the route table: logical operation → path
//! - [`TokenStore`] abstracts where bearer tokens live (memory or session)
//! - Every call yields an [`ApiResponse`] envelope; nothing escapes as a panic
//!   or an unstructured error
//!
//! # Authentication
//!
//! Calls made with [`Auth::Required`] carry `Authorization: Bearer <token>`
//! when the store has one. A 401 on such a call triggers exactly one refresh
//! through `POST /auth/refresh`. A successful refresh does NOT replay the
//! original request: the caller gets [`FailureKind::RetryRequired`] and
//! decides whether to resubmit.
//!
//! # Example
//!
//! ```rust,ignore
//! use lensway_storefront::api::{ApiClient, Auth, Endpoint};
//!
//! let client = ApiClient::new("http://localhost:5000/api");
//! let products = client
//!     .get::<Vec<Product>>(&Endpoint::Products.path(), Auth::Public)
//!     .await
//!     .into_result()?;
//! ```

pub mod client;
pub mod routes;
pub mod tokens;

pub use client::{ApiClient, Auth};
pub use routes::Endpoint;
pub use tokens::{MemoryTokenStore, SessionTokenStore, TokenPair, TokenStore};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distinguished failure cases reported in an envelope.
///
/// The first group comes from backend calls; the second only from the
/// storefront's own handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request never produced an HTTP response.
    Network,
    /// The backend answered with a non-2xx status.
    Status,
    /// The access token was refreshed; the caller should resubmit.
    RetryRequired,
    /// The body could not be parsed into the expected shape.
    InvalidResponse,
    /// The request body could not be serialized.
    InvalidRequest,
    /// A 2xx envelope reported `success: false`.
    Rejected,
    /// The request was cancelled before it completed.
    Cancelled,

    /// Input failed field validation; `data` holds the field errors.
    Validation,
    /// The action needs a logged-in customer.
    LoginRequired,
    NotFound,
    BadRequest,
    Internal,
}

/// Normalized response envelope: `{ success, data?, message?, error? }`.
///
/// The storefront also uses this shape for its own JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
    /// HTTP status of the backend response, when there was one.
    #[serde(skip)]
    pub status: Option<u16>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            status: None,
        }
    }

    /// Successful response without data.
    #[must_use]
    pub const fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error: None,
            status: None,
        }
    }

    /// Failed response.
    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: Some(kind),
            status: None,
        }
    }

    /// The "token refreshed, please retry" signal.
    #[must_use]
    pub fn retry_required() -> Self {
        Self::failure(
            FailureKind::RetryRequired,
            "Your session was refreshed. Please try again.",
        )
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Attach the HTTP status the backend returned.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether the caller should resubmit after a token refresh.
    #[must_use]
    pub fn needs_retry(&self) -> bool {
        self.error == Some(FailureKind::RetryRequired)
    }

    /// Convert into a `Result`, requiring data on success.
    ///
    /// # Errors
    ///
    /// Returns the failure as an [`ApiError`], or [`ApiError::MissingData`]
    /// when the call succeeded without data.
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.success {
            return self.data.ok_or(ApiError::MissingData);
        }
        Err(self.into_error())
    }

    /// Convert into a `Result`, allowing success without data.
    ///
    /// # Errors
    ///
    /// Returns the failure as an [`ApiError`].
    pub fn into_optional(self) -> Result<Option<T>, ApiError> {
        if self.success {
            return Ok(self.data);
        }
        Err(self.into_error())
    }

    /// Convert into a `Result`, discarding any data.
    ///
    /// # Errors
    ///
    /// Returns the failure as an [`ApiError`].
    pub fn into_unit(self) -> Result<(), ApiError> {
        self.into_optional().map(|_| ())
    }

    fn into_error(self) -> ApiError {
        let message = self
            .message
            .unwrap_or_else(|| "Request failed".to_string());

        match self.error {
            Some(FailureKind::Network) => ApiError::Network(message),
            Some(FailureKind::Status) => ApiError::Status {
                status: self.status.unwrap_or(500),
                message,
            },
            Some(FailureKind::RetryRequired) => ApiError::RetryRequired,
            Some(FailureKind::InvalidResponse) => ApiError::InvalidResponse(message),
            Some(FailureKind::InvalidRequest) => ApiError::InvalidRequest(message),
            Some(FailureKind::Cancelled) => ApiError::Cancelled,
            Some(
                FailureKind::Rejected
                | FailureKind::Validation
                | FailureKind::LoginRequired
                | FailureKind::NotFound
                | FailureKind::BadRequest
                | FailureKind::Internal,
            )
            | None => ApiError::Rejected(message),
        }
    }
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Network-layer failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the backend's own message when it sent one.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Access token was refreshed; resubmit the request.
    #[error("Token refreshed, retry the request")]
    RetryRequired,

    /// Response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request body could not be serialized.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend envelope reported failure.
    #[error("{0}")]
    Rejected(String),

    /// Request was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// Call succeeded but carried no data where data was expected.
    #[error("Response contained no data")]
    MissingData,
}

impl ApiError {
    /// Message suitable for showing to the customer.
    ///
    /// Backend messages pass through verbatim; transport details do not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) => message.clone(),
            Self::RetryRequired => "Your session was refreshed. Please try again.".to_string(),
            Self::Cancelled => "Request cancelled".to_string(),
            Self::Network(_) => "Unable to reach the server. Please try again.".to_string(),
            Self::InvalidResponse(_) | Self::InvalidRequest(_) | Self::MissingData => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
