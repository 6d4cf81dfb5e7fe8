//! Lens catalog and customization wizard handlers.
//!
//! The catalog is loaded fresh for each wizard action so prices always
//! reflect the backend.

use axum::{
    Json,
    extract::{Path, State},
};
use tower_sessions::Session;
use tracing::instrument;

use lensway_core::ProductId;

use super::{ApiJson, ok};
use crate::cart::{CartSummary, load_cart, save_cart};
use crate::customize::{self, CustomizationView, CustomizeError, LensCustomization, LensSelection};
use crate::error::{AppError, Result};
use crate::services::lens::LensCatalog;
use crate::state::AppState;

async fn in_progress(session: &Session) -> Result<LensCustomization> {
    customize::load(session)
        .await
        .ok_or(AppError::Customize(CustomizeError::NotStarted))
}

/// Everything the wizard offers.
#[instrument(skip(state))]
pub async fn catalog(State(state): State<AppState>) -> Result<ApiJson<LensCatalog>> {
    Ok(ok(LensCatalog::load(state.api()).await?))
}

/// Current wizard state.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<ApiJson<CustomizationView>> {
    let custom = in_progress(&session).await?;
    let catalog = LensCatalog::load(state.api()).await?;
    Ok(ok(custom.view(&catalog)))
}

/// Start customizing a frame, replacing any customization in progress.
#[instrument(skip(state, session))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<String>,
) -> Result<ApiJson<CustomizationView>> {
    let product = state.catalog().get(&ProductId::new(product_id)).await?;
    let catalog = LensCatalog::load(state.api()).await?;

    let custom = LensCustomization::start(&product);
    customize::save(&session, &custom).await?;
    Ok(ok(custom.view(&catalog)))
}

/// Record the current step's selection and advance.
#[instrument(skip(state, session, selection))]
pub async fn next(
    State(state): State<AppState>,
    session: Session,
    Json(selection): Json<LensSelection>,
) -> Result<ApiJson<CustomizationView>> {
    let mut custom = in_progress(&session).await?;
    let catalog = LensCatalog::load(state.api()).await?;

    custom.advance(selection, &catalog)?;
    customize::save(&session, &custom).await?;
    Ok(ok(custom.view(&catalog)))
}

/// Step back.
pub async fn back(
    State(state): State<AppState>,
    session: Session,
) -> Result<ApiJson<CustomizationView>> {
    let mut custom = in_progress(&session).await?;
    let catalog = LensCatalog::load(state.api()).await?;

    custom.back();
    customize::save(&session, &custom).await?;
    Ok(ok(custom.view(&catalog)))
}

/// Add the reviewed frame and lenses to the cart.
#[instrument(skip(state, session))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
) -> Result<ApiJson<CartSummary>> {
    let custom = in_progress(&session).await?;
    let catalog = LensCatalog::load(state.api()).await?;
    let line = custom.complete(&catalog)?;

    let mut cart = load_cart(&session).await;
    cart.add(line)?;
    save_cart(&session, &cart).await?;
    customize::clear(&session).await;

    Ok(ok(cart.summary()))
}
