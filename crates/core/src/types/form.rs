//! Backend-driven form schemas for the lead-capture and support forms.
//!
//! The backend decides which fields a form shows. A [`FormConfig`] is fetched
//! when the form opens; the field kind is a tagged union so rendering and
//! validation need no reflection over the payload.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::{ValidationErrors, ValidationRule};

/// The lead-capture and support forms offered by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    /// Product demo request.
    Demo,
    /// Two-step pricing request wizard.
    Pricing,
    /// Credentials (account access) request.
    Credentials,
    /// Support ticket, may carry attachments.
    Support,
    /// Job application, may carry a resume.
    JobApplication,
}

impl FormKind {
    /// All form kinds.
    pub const ALL: [Self; 5] = [
        Self::Demo,
        Self::Pricing,
        Self::Credentials,
        Self::Support,
        Self::JobApplication,
    ];

    /// URL slug for this form kind.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Pricing => "pricing",
            Self::Credentials => "credentials",
            Self::Support => "support",
            Self::JobApplication => "job-application",
        }
    }

    /// Whether submissions of this kind may carry file attachments.
    #[must_use]
    pub const fn accepts_attachments(self) -> bool {
        matches!(self, Self::Support | Self::JobApplication)
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when parsing an unknown form slug.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown form: {0}")]
pub struct UnknownFormKind(pub String);

impl FromStr for FormKind {
    type Err = UnknownFormKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownFormKind(s.to_owned()))
    }
}

/// Server-supplied descriptor of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Form title shown in the modal header.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional introductory text.
    #[serde(default)]
    pub description: Option<String>,
    /// Fields in display order.
    pub fields: Vec<FormField>,
    /// Message shown after a successful submission.
    #[serde(default)]
    pub success_message: Option<String>,
}

/// A single field of a [`FormConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Field identifier, used as the submission key.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Kind-specific attributes, tagged by `type`.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Validation rule (required, pattern, length).
    #[serde(flatten)]
    pub rule: ValidationRule,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Wizard step this field belongs to (zero-based). Absent means step 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

/// Field kinds, tagged by the schema's `type` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
    Textarea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
    },
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    File {
        /// Accepted MIME types or extensions, as in an HTML `accept` attribute.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accept: Option<String>,
        #[serde(default)]
        multiple: bool,
    },
}

impl FieldKind {
    /// Whether values of this kind arrive as attachments.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

/// Option of a select field. Accepts a bare string or `{ value, label }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectOption {
    Plain(String),
    Labeled { value: String, label: String },
}

impl SelectOption {
    /// Submitted value of the option.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(value) | Self::Labeled { value, .. } => value,
        }
    }
}

/// A file attached to a submission, inlined as base64.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Id of the file field this attachment belongs to.
    pub field_id: String,
    /// Original file name.
    pub filename: String,
    /// MIME type reported by the uploader.
    pub content_type: String,
    /// Size of the decoded content in bytes.
    pub size: usize,
    /// Base64-encoded file content.
    pub data: String,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("field_id", &self.field_id)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// JSON payload posted to a form's submission endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Field values keyed by field id.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Inlined file attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl FormSubmission {
    /// Value of a field, if present.
    #[must_use]
    pub fn value(&self, field_id: &str) -> Option<&str> {
        self.values.get(field_id).map(String::as_str)
    }

    /// Whether at least one attachment belongs to the field.
    #[must_use]
    pub fn has_attachment(&self, field_id: &str) -> bool {
        self.attachments.iter().any(|a| a.field_id == field_id)
    }
}

impl FormConfig {
    /// Number of wizard steps the fields span (at least 1).
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.step.unwrap_or(0) + 1)
            .max()
            .unwrap_or(1)
    }

    /// Fields shown on a given wizard step.
    pub fn fields_for_step(&self, step: usize) -> impl Iterator<Item = &FormField> {
        self.fields
            .iter()
            .filter(move |f| f.step.unwrap_or(0) == step)
    }

    /// Validate a whole submission against the schema.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self, submission: &FormSubmission) -> Result<(), ValidationErrors> {
        validate_fields(self.fields.iter(), submission)
    }

    /// Validate only the fields of one wizard step.
    ///
    /// # Errors
    ///
    /// Returns every failing field of that step.
    pub fn validate_step(
        &self,
        step: usize,
        submission: &FormSubmission,
    ) -> Result<(), ValidationErrors> {
        validate_fields(self.fields_for_step(step), submission)
    }
}

fn validate_fields<'a>(
    fields: impl Iterator<Item = &'a FormField>,
    submission: &FormSubmission,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for field in fields {
        if field.kind.is_file() {
            if field.rule.required && !submission.has_attachment(&field.id) {
                errors.add(&field.id, format!("{} is required", field.label));
            }
            continue;
        }
        errors.check(
            &field.id,
            &field.label,
            &field.rule,
            submission.value(&field.id),
        );
    }

    errors.into_result()
}
