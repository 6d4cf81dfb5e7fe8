//! Liveness endpoint.

use serde::Serialize;

use super::{ApiJson, ok};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// Returns ok if the server is running. Does not check the backend.
pub async fn health() -> ApiJson<Health> {
    ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
