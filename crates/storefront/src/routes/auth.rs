//! Authentication route handlers.
//!
//! The backend issues the tokens; the storefront keeps them and the
//! customer's identity in the session.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::{ApiJson, ok};
use crate::api::{ApiResponse, SessionTokenStore, TokenStore};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, SessionApi, clear_current_customer, set_current_customer};
use crate::services::auth::{self, AuthSession, Customer, LoginRequest, RegisterRequest};
use crate::state::AppState;

/// Move the visitor into a logged-in session.
async fn establish(session: &Session, auth: AuthSession) -> Result<Customer> {
    // New id on privilege change
    session.cycle_id().await?;

    if let Some(tokens) = auth.tokens() {
        SessionTokenStore::new(session.clone()).store(tokens).await;
    } else {
        warn!("Backend issued no access token");
    }

    let current = auth.user.to_current();
    set_current_customer(session, &current).await?;
    set_sentry_user(&current.id, Some(&current.email));

    Ok(auth.user)
}

/// Log in with email and password.
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<ApiJson<Customer>> {
    let auth = auth::login(state.api(), &request).await?;
    let customer = establish(&session, auth).await?;
    tracing::info!(customer_id = %customer.id, "Customer logged in");
    Ok(ok(customer))
}

/// Create an account and log in.
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<ApiJson<Customer>> {
    let auth = auth::register(state.api(), &request).await?;
    let customer = establish(&session, auth).await?;
    tracing::info!(customer_id = %customer.id, "Customer registered");
    Ok(ok(customer))
}

/// Log out. The backend is told best effort; local state is always cleared.
#[instrument(skip_all)]
pub async fn logout(
    SessionApi(api): SessionApi,
    session: Session,
) -> Result<ApiJson<()>> {
    if let Err(e) = auth::logout(&api).await {
        warn!(error = %e, "Backend logout failed");
    }

    api.tokens().clear().await;
    clear_current_customer(&session).await?;
    clear_sentry_user();

    Ok(Json(
        ApiResponse::ok_empty().with_message(Some("You have been logged out".to_string())),
    ))
}

/// The logged-in customer, fresh from the backend.
#[instrument(skip_all, fields(customer_id = %current.id))]
pub async fn me(
    RequireAuth(current): RequireAuth,
    SessionApi(api): SessionApi,
) -> Result<ApiJson<Customer>> {
    Ok(ok(auth::me(&api).await?))
}
