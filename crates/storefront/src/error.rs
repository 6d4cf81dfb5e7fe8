//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Every error renders as an
//! [`ApiResponse`] failure body; server-side errors are captured to Sentry
//! before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use lensway_core::ValidationErrors;

use crate::api::{ApiError, ApiResponse, FailureKind};
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::customize::CustomizeError;
use crate::services::forms::FormError;
use crate::services::prescriptions::PrescriptionError;

/// Where guests are sent when an action needs an account.
pub const LOGIN_PATH: &str = "/auth/login";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Input failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Lens customization error: {0}")]
    Customize(#[from] CustomizeError),

    /// Action needs a logged-in customer; the client should redirect.
    #[error("Login required")]
    LoginRequired { redirect_after_ms: u64 },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a checkout failure, attaching the guest redirect delay.
    #[must_use]
    pub fn checkout(err: CheckoutError, redirect_after_ms: u64) -> Self {
        match err {
            CheckoutError::LoginRequired => Self::LoginRequired { redirect_after_ms },
            CheckoutError::EmptyCart => Self::BadRequest(err.to_string()),
            CheckoutError::Invalid(errors) => Self::Validation(errors),
            CheckoutError::Api(e) => Self::Api(e),
        }
    }

    /// HTTP status and envelope error kind.
    fn classify(&self) -> (StatusCode, FailureKind) {
        match self {
            Self::Api(err) => match err {
                ApiError::Status { status, .. } if (400..500).contains(status) => (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
                    FailureKind::Status,
                ),
                ApiError::RetryRequired => (StatusCode::UNAUTHORIZED, FailureKind::RetryRequired),
                ApiError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, FailureKind::Cancelled),
                ApiError::Rejected(_) => (StatusCode::UNPROCESSABLE_ENTITY, FailureKind::Rejected),
                ApiError::Status { .. } => (StatusCode::BAD_GATEWAY, FailureKind::Status),
                ApiError::Network(_) => (StatusCode::BAD_GATEWAY, FailureKind::Network),
                ApiError::InvalidResponse(_) | ApiError::MissingData => {
                    (StatusCode::BAD_GATEWAY, FailureKind::InvalidResponse)
                }
                ApiError::InvalidRequest(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, FailureKind::InvalidRequest)
                }
            },
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, FailureKind::Validation),
            Self::Cart(CartError::LineNotFound(_)) | Self::Customize(CustomizeError::NotStarted) => {
                (StatusCode::NOT_FOUND, FailureKind::NotFound)
            }
            Self::Cart(_) | Self::Customize(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, FailureKind::BadRequest)
            }
            Self::LoginRequired { .. } => (StatusCode::UNAUTHORIZED, FailureKind::LoginRequired),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, FailureKind::LoginRequired),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, FailureKind::NotFound),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, FailureKind::BadRequest),
            Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, FailureKind::Internal)
            }
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Validation(_) => "Please correct the highlighted fields".to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Customize(err) => err.to_string(),
            Self::LoginRequired { .. } => "Please log in to continue".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            Self::LoginRequired { redirect_after_ms } => Some(json!({
                "redirect": LOGIN_PATH,
                "redirect_after_ms": redirect_after_ms,
            })),
            _ => None,
        }
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Invalid(errors) => Self::Validation(errors),
            FormError::AttachmentsNotAccepted | FormError::UnknownStep { .. } => {
                Self::BadRequest(err.to_string())
            }
            FormError::Api(e) => Self::Api(e),
        }
    }
}

impl From<PrescriptionError> for AppError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::Invalid(errors) => Self::Validation(errors),
            PrescriptionError::Api(e) => Self::Api(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.classify();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut body = ApiResponse::<serde_json::Value>::failure(kind, self.public_message());
        body.data = self.data();

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a customer action.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
