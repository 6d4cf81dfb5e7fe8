//! Lead-capture and support form handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lensway_core::{FormConfig, FormKind, FormSubmission};

use super::{ApiJson, ok};
use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::forms::{FormReceipt, encode_attachment};
use crate::state::AppState;
use crate::wizard::{PricingStep, Wizard};

#[derive(Debug, Deserialize)]
pub struct StepForm {
    pub step: usize,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Where the wizard stands after a validated step.
#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub step: PricingStep,
    pub step_index: usize,
    /// The validated step was the last; the form can be submitted.
    pub complete: bool,
}

fn parse_kind(slug: &str) -> Result<FormKind> {
    slug.parse()
        .map_err(|e: lensway_core::form::UnknownFormKind| AppError::NotFound(e.0))
}

fn receipt(receipt: FormReceipt) -> ApiJson<FormReceipt> {
    let message = receipt.message.clone();
    Json(ApiResponse::ok(receipt).with_message(Some(message)))
}

/// Form schema.
#[instrument(skip(state))]
pub async fn config(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<ApiJson<FormConfig>> {
    let kind = parse_kind(&kind)?;
    Ok(ok(state.forms().config(kind).await?))
}

/// JSON submission.
#[instrument(skip(state, submission))]
pub async fn submit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(submission): Json<FormSubmission>,
) -> Result<ApiJson<FormReceipt>> {
    let kind = parse_kind(&kind)?;
    Ok(receipt(state.forms().submit(kind, &submission).await?))
}

/// Multipart submission. Text parts become values; file parts become
/// base64 attachments keyed by their part name.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Result<ApiJson<FormReceipt>> {
    let kind = parse_kind(&kind)?;
    let mut submission = FormSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(String::from) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            submission
                .attachments
                .push(encode_attachment(name, filename, content_type, &bytes));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            submission.values.insert(name, value);
        }
    }

    Ok(receipt(state.forms().submit(kind, &submission).await?))
}

/// Validate one step of the pricing wizard.
#[instrument(skip(state, form), fields(step = form.step))]
pub async fn step(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(form): Json<StepForm>,
) -> Result<ApiJson<StepOutcome>> {
    let kind = parse_kind(&kind)?;
    if kind != FormKind::Pricing {
        return Err(AppError::BadRequest(format!("The {kind} form has no steps")));
    }

    let submission = FormSubmission {
        values: form.values,
        attachments: Vec::new(),
    };
    let count = state
        .forms()
        .validate_step(kind, form.step, &submission)
        .await?;

    // The backend's field layout decides where the form ends
    let complete = form.step + 1 >= count;
    let step_index = if complete { form.step } else { form.step + 1 };

    Ok(ok(StepOutcome {
        step: Wizard::<PricingStep>::at(step_index).current(),
        step_index,
        complete,
    }))
}
