//! Authentication extractors.
//!
//! Identity lives in the session under [`session_keys::CURRENT_CUSTOMER`];
//! backend tokens live beside it, read through [`SessionTokenStore`].

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::api::{ApiClient, SessionTokenStore};
use crate::error::AppError;
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in customer.
///
/// ```rust,ignore
/// async fn orders(RequireAuth(customer): RequireAuth) -> Result<Json<...>> { ... }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        current_customer(session)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Please log in to continue".to_string()))
    }
}

/// Extractor that optionally gets the current customer.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => current_customer(session).await,
            None => None,
        };

        Ok(Self(customer))
    }
}

/// API client that attaches the visitor's session tokens.
pub struct SessionApi(pub ApiClient);

impl FromRequestParts<AppState> for SessionApi {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let tokens = Arc::new(SessionTokenStore::new(session));
        Ok(Self(state.api().clone().with_tokens(tokens)))
    }
}

async fn current_customer(session: &Session) -> Option<CurrentCustomer> {
    session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()
}

/// Helper to set the current customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Helper to clear the current customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
