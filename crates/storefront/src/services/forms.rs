//! Lead-capture and support forms.
//!
//! Form schemas come from the backend and are cached for 5 minutes.
//! Submissions are validated against the schema before anything is posted.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use lensway_core::{Attachment, FormConfig, FormKind, FormSubmission, ValidationErrors};

use crate::api::{ApiClient, ApiError, Auth, Endpoint};

/// Errors from form operations.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Form is invalid: {0}")]
    Invalid(ValidationErrors),

    #[error("This form does not accept attachments")]
    AttachmentsNotAccepted,

    #[error("Step {step} does not exist (form has {count} steps)")]
    UnknownStep { step: usize, count: usize },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FormReceipt {
    pub message: String,
}

/// Cached schemas plus validate-then-submit.
#[derive(Clone)]
pub struct FormService {
    api: ApiClient,
    configs: Cache<FormKind, FormConfig>,
}

impl FormService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let configs = Cache::builder()
            .max_capacity(32)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { api, configs }
    }

    /// Schema of a form.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self), fields(form = %kind))]
    pub async fn config(&self, kind: FormKind) -> Result<FormConfig, ApiError> {
        if let Some(config) = self.configs.get(&kind).await {
            debug!("Cache hit for form config");
            return Ok(config);
        }

        let config: FormConfig = self
            .api
            .get(&Endpoint::FormConfig(kind).path(), Auth::Public)
            .await
            .into_result()?;

        self.configs.insert(kind, config.clone()).await;
        Ok(config)
    }

    /// Validate one wizard step, returning the form's step count.
    ///
    /// # Errors
    ///
    /// Returns the step's field errors, or [`FormError::UnknownStep`].
    pub async fn validate_step(
        &self,
        kind: FormKind,
        step: usize,
        submission: &FormSubmission,
    ) -> Result<usize, FormError> {
        let config = self.config(kind).await?;
        let count = config.step_count();
        if step >= count {
            return Err(FormError::UnknownStep { step, count });
        }
        config
            .validate_step(step, submission)
            .map_err(FormError::Invalid)?;
        Ok(count)
    }

    /// Validate a submission and post it to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Invalid`] with every failing field and makes no
    /// submit call; otherwise the backend failure.
    #[instrument(skip(self, submission), fields(form = %kind, attachments = submission.attachments.len()))]
    pub async fn submit(
        &self,
        kind: FormKind,
        submission: &FormSubmission,
    ) -> Result<FormReceipt, FormError> {
        if !submission.attachments.is_empty() && !kind.accepts_attachments() {
            return Err(FormError::AttachmentsNotAccepted);
        }

        let config = self.config(kind).await?;
        config.validate(submission).map_err(FormError::Invalid)?;

        let response = self
            .api
            .post::<_, serde_json::Value>(&Endpoint::FormSubmit(kind).path(), submission, Auth::Public)
            .await;
        let backend_message = response.message.clone();
        response.into_unit()?;

        let message = backend_message
            .or(config.success_message)
            .unwrap_or_else(|| "Thank you! We'll be in touch soon.".to_string());

        Ok(FormReceipt { message })
    }
}

/// Inline an uploaded file as a base64 attachment.
#[must_use]
pub fn encode_attachment(
    field_id: impl Into<String>,
    filename: impl Into<String>,
    content_type: impl Into<String>,
    bytes: &[u8],
) -> Attachment {
    Attachment {
        field_id: field_id.into(),
        filename: filename.into(),
        content_type: content_type.into(),
        size: bytes.len(),
        data: STANDARD.encode(bytes),
    }
}
