//! Product route handlers.

use axum::extract::{Path, Query, State};
use tracing::instrument;

use lensway_core::ProductId;

use super::{ApiJson, ok};
use crate::error::Result;
use crate::services::catalog::{Product, ProductPage, ProductQuery};
use crate::state::AppState;

/// Product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<ApiJson<ProductPage>> {
    Ok(ok(state.catalog().list(&query).await?))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<ApiJson<Product>> {
    Ok(ok(state.catalog().get(&ProductId::new(id)).await?))
}
