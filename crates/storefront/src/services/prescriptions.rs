//! Customer prescriptions.

use thiserror::Error;
use tracing::instrument;

use lensway_core::{Prescription, PrescriptionId, ValidationErrors};

use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// Errors from prescription writes.
#[derive(Debug, Error)]
pub enum PrescriptionError {
    #[error("Invalid prescription: {0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// List the customer's prescriptions.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api))]
pub async fn list(api: &ApiClient) -> Result<Vec<Prescription>, ApiError> {
    Ok(api
        .get::<Vec<Prescription>>(&Endpoint::Prescriptions.path(), Auth::Required)
        .await
        .into_optional()?
        .unwrap_or_default())
}

/// Fetch one prescription.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api), fields(prescription_id = %id))]
pub async fn get(api: &ApiClient, id: &PrescriptionId) -> Result<Prescription, ApiError> {
    api.get(&Endpoint::Prescription(id).path(), Auth::Required)
        .await
        .into_result()
}

/// Validate and create a prescription.
///
/// # Errors
///
/// Returns [`PrescriptionError::Invalid`] without calling the backend when
/// required values are missing.
#[instrument(skip_all)]
pub async fn create(
    api: &ApiClient,
    prescription: &Prescription,
) -> Result<Prescription, PrescriptionError> {
    prescription.validate().map_err(PrescriptionError::Invalid)?;

    Ok(api
        .post(&Endpoint::Prescriptions.path(), prescription, Auth::Required)
        .await
        .into_result()?)
}

/// Validate and replace a prescription.
///
/// # Errors
///
/// Returns [`PrescriptionError::Invalid`] without calling the backend when
/// required values are missing.
#[instrument(skip(api, prescription), fields(prescription_id = %id))]
pub async fn update(
    api: &ApiClient,
    id: &PrescriptionId,
    prescription: &Prescription,
) -> Result<Prescription, PrescriptionError> {
    prescription.validate().map_err(PrescriptionError::Invalid)?;

    Ok(api
        .put(&Endpoint::Prescription(id).path(), prescription, Auth::Required)
        .await
        .into_result()?)
}

/// Delete a prescription.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api), fields(prescription_id = %id))]
pub async fn delete(api: &ApiClient, id: &PrescriptionId) -> Result<(), ApiError> {
    api.delete::<serde_json::Value>(&Endpoint::Prescription(id).path(), Auth::Required)
        .await
        .into_unit()
}
