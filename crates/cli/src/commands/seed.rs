//! Seed backend reference data.
//!
//! Lens types are matched by slug: a type the backend already has is left
//! untouched, so running the seeder twice creates nothing the second time.
//! Progressive variants are attached only to a Progressive type created by
//! the same run.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use lensway_storefront::api::{ApiClient, ApiError, Auth, MemoryTokenStore, TokenPair};
use lensway_storefront::config::resolve_api_url;
use lensway_storefront::services::lens::{LensType, LensTypeVariant};

/// Fixed lens type list shipped with the binary.
const LENS_TYPES_YAML: &str = include_str!("../../seed/lens_types.yaml");

const ADMIN_LENS_TYPES_PATH: &str = "/admin/prescription-lens-types";

const PROGRESSIVE_SLUG: &str = "progressive";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("No admin token: pass --token or set LENSWAY_ADMIN_TOKEN")]
    MissingToken,

    #[error("Invalid seed data: {0}")]
    Plan(#[from] serde_yaml::Error),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),
}

/// Lens types and progressive variants to ensure exist.
#[derive(Debug, Deserialize)]
pub struct SeedPlan {
    pub lens_types: Vec<LensTypeSeed>,
    #[serde(default)]
    pub progressive_variants: Vec<LensTypeVariant>,
}

impl SeedPlan {
    /// The plan embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Plan`] if the embedded YAML does not parse.
    pub fn embedded() -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(LENS_TYPES_YAML)?)
    }
}

/// One lens type to create. Serialized as the admin create body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LensTypeSeed {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Decimal,
}

impl LensTypeSeed {
    fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub variants_created: usize,
}

/// Entry point for `lw-cli seed lens-types`.
///
/// # Errors
///
/// Returns an error if no token is given or the existing types cannot be
/// listed. Failures creating individual items are logged and counted.
pub async fn run_lens_types(
    token: Option<SecretString>,
    api_url: Option<&str>,
) -> Result<SeedSummary, SeedError> {
    let token = token.ok_or(SeedError::MissingToken)?;
    let base_url = resolve_api_url(api_url, std::env::var("LENSWAY_ENV").ok().as_deref());

    info!(api_url = %base_url, "Seeding prescription lens types");

    let tokens = MemoryTokenStore::with_tokens(TokenPair {
        access_token: token,
        refresh_token: None,
    });
    let api = ApiClient::new(base_url).with_tokens(Arc::new(tokens));

    let plan = SeedPlan::embedded()?;
    let summary = seed_lens_types(&api, &plan).await?;

    info!(
        created = summary.created,
        skipped = summary.skipped,
        failed = summary.failed,
        variants_created = summary.variants_created,
        "Lens type seeding complete"
    );

    Ok(summary)
}

/// Create every lens type in `plan` whose slug the backend lacks.
///
/// # Errors
///
/// Returns an error only if the existing types cannot be listed.
pub async fn seed_lens_types(api: &ApiClient, plan: &SeedPlan) -> Result<SeedSummary, SeedError> {
    let existing: Vec<LensType> = api
        .get::<Vec<LensType>>(ADMIN_LENS_TYPES_PATH, Auth::Required)
        .await
        .into_optional()?
        .unwrap_or_default();

    let existing_slugs: HashSet<String> = existing
        .iter()
        .map(|t| t.slug.clone().unwrap_or_else(|| slugify(&t.name)))
        .collect();

    let mut summary = SeedSummary::default();

    for seed in &plan.lens_types {
        let slug = seed.slug();

        if existing_slugs.contains(&slug) {
            info!(slug = %slug, "Lens type exists, skipping");
            summary.skipped += 1;
            continue;
        }

        let body = LensTypeSeed {
            slug: Some(slug.clone()),
            ..seed.clone()
        };

        match api
            .post::<_, LensType>(ADMIN_LENS_TYPES_PATH, &body, Auth::Required)
            .await
            .into_result()
        {
            Ok(created) => {
                info!(slug = %slug, id = %created.id, "Created lens type");
                summary.created += 1;

                if slug == PROGRESSIVE_SLUG {
                    summary.variants_created +=
                        attach_variants(api, &created, &plan.progressive_variants).await;
                }
            }
            Err(e) => {
                warn!(slug = %slug, error = %e, "Failed to create lens type");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn attach_variants(
    api: &ApiClient,
    lens_type: &LensType,
    variants: &[LensTypeVariant],
) -> usize {
    let path = format!("{ADMIN_LENS_TYPES_PATH}/{}/variants", lens_type.id);
    let mut created = 0;

    for variant in variants {
        let result = api
            .post::<_, serde::de::IgnoredAny>(&path, variant, Auth::Required)
            .await
            .into_unit();

        match result {
            Ok(()) => {
                info!(variant = %variant.name, "Attached progressive variant");
                created += 1;
            }
            Err(e) => warn!(variant = %variant.name, error = %e, "Failed to attach variant"),
        }
    }

    created
}

/// "Digital Free-Form" -> "digital-free-form".
fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> ApiClient {
        let tokens = MemoryTokenStore::with_tokens(TokenPair::new("admin-token", None));
        ApiClient::new(server.uri()).with_tokens(Arc::new(tokens))
    }

    fn existing(slugs: &[&str]) -> serde_json::Value {
        let types: Vec<_> = slugs
            .iter()
            .enumerate()
            .map(|(i, slug)| json!({ "id": i + 1, "name": slug, "slug": slug }))
            .collect();
        json!({ "success": true, "data": types })
    }

    #[test]
    fn test_embedded_plan_parses() {
        let plan = SeedPlan::embedded().unwrap();
        let slugs: Vec<_> = plan.lens_types.iter().map(LensTypeSeed::slug).collect();
        assert_eq!(
            slugs,
            [
                "single-vision",
                "progressive",
                "bifocal",
                "reading",
                "non-prescription"
            ]
        );
        assert_eq!(plan.progressive_variants.len(), 3);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Digital Free-Form"), "digital-free-form");
        assert_eq!(slugify("  Single   Vision "), "single-vision");
    }

    #[tokio::test]
    async fn test_second_run_creates_nothing() {
        let server = MockServer::start().await;
        let plan = SeedPlan::embedded().unwrap();

        Mock::given(method("GET"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .and(header("authorization", "Bearer admin-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(existing(&[
                "single-vision",
                "progressive",
                "bifocal",
                "reading",
                "non-prescription",
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let summary = seed_lens_types(&client(&server), &plan).await.unwrap();
        assert_eq!(summary.created, 0);
        assert_eq!(summary.skipped, 5);
    }

    #[tokio::test]
    async fn test_creates_missing_and_attaches_progressive_variants() {
        let server = MockServer::start().await;
        let plan = SeedPlan::embedded().unwrap();

        Mock::given(method("GET"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(existing(&["single-vision"])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .and(body_partial_json(json!({ "slug": "progressive" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": { "id": 7, "name": "Progressive", "slug": "progressive" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": { "id": 8, "name": "Other" }
            })))
            .expect(3)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/admin/prescription-lens-types/7/variants"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true })))
            .expect(3)
            .mount(&server)
            .await;

        let summary = seed_lens_types(&client(&server), &plan).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                created: 4,
                skipped: 1,
                failed: 0,
                variants_created: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_existing_progressive_gets_no_variants() {
        let server = MockServer::start().await;
        let plan = SeedPlan::embedded().unwrap();

        Mock::given(method("GET"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(existing(&["progressive", "bifocal", "reading"])),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": { "id": 9, "name": "New" }
            })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/admin/prescription-lens-types/1/variants"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let summary = seed_lens_types(&client(&server), &plan).await.unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.variants_created, 0);
    }

    #[tokio::test]
    async fn test_item_failures_are_counted_and_skipped() {
        let server = MockServer::start().await;
        let plan = SeedPlan::embedded().unwrap();

        Mock::given(method("GET"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(existing(&[
                "single-vision",
                "progressive",
                "reading",
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .and(body_partial_json(json!({ "slug": "bifocal" })))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(ADMIN_LENS_TYPES_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": { "id": 10, "name": "Non-Prescription" }
            })))
            .mount(&server)
            .await;

        let summary = seed_lens_types(&client(&server), &plan).await.unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts() {
        let server = MockServer::start().await;
        let plan = SeedPlan::embedded().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden" })))
            .mount(&server)
            .await;

        let err = seed_lens_types(&client(&server), &plan).await.unwrap_err();
        assert!(matches!(err, SeedError::Api(ApiError::Status { status: 403, .. })));
    }

    #[tokio::test]
    async fn test_missing_token() {
        let err = run_lens_types(None, Some("http://127.0.0.1:9")).await.unwrap_err();
        assert!(matches!(err, SeedError::MissingToken));
    }
}
