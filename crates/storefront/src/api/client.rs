//! HTTP client for the backend REST API.

use std::sync::Arc;

use reqwest::{Method, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::routes::Endpoint;
use super::tokens::{MemoryTokenStore, TokenPair, TokenStore};
use super::{ApiResponse, FailureKind};

/// Whether a call carries the customer's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Never sends `Authorization`.
    Public,
    /// Sends `Authorization: Bearer` when a token is stored, and refreshes once on 401.
    Required,
}

/// Client for the backend REST API.
///
/// Cheap to clone. Clones share the connection pool; each clone may carry its
/// own token store and cancellation token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    tokens: Arc<dyn TokenStore>,
    cancel: Option<CancellationToken>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

/// Body of a successful `/auth/refresh`.
#[derive(Debug, serde::Deserialize)]
struct RefreshedTokens {
    #[serde(alias = "accessToken", alias = "token")]
    access_token: String,
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl ApiClient {
    /// Create a client for `base_url` with an empty in-memory token store.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
            }),
            tokens: Arc::new(MemoryTokenStore::new()),
            cancel: None,
        }
    }

    /// Use `tokens` for bearer tokens.
    #[must_use]
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Abort in-flight calls when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Backend base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The token store this client reads from.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> ApiResponse<T> {
        self.request(Method::GET, path, None, auth).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, auth: Auth) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match serde_json::to_value(body) {
            Ok(body) => self.request(Method::POST, path, Some(body), auth).await,
            Err(e) => ApiResponse::failure(FailureKind::InvalidRequest, e.to_string()),
        }
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, auth: Auth) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match serde_json::to_value(body) {
            Ok(body) => self.request(Method::PUT, path, Some(body), auth).await,
            Err(e) => ApiResponse::failure(FailureKind::InvalidRequest, e.to_string()),
        }
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B, auth: Auth) -> ApiResponse<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match serde_json::to_value(body) {
            Ok(body) => self.request(Method::PATCH, path, Some(body), auth).await,
            Err(e) => ApiResponse::failure(FailureKind::InvalidRequest, e.to_string()),
        }
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> ApiResponse<T> {
        self.request(Method::DELETE, path, None, auth).await
    }

    /// Issue a request, racing it against the cancellation token when one is bound.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> ApiResponse<T> {
        let call = self.execute(method, path, body, auth);

        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!(path, "Request cancelled");
                        ApiResponse::failure(FailureKind::Cancelled, "Request cancelled")
                    }
                    response = call => response,
                }
            }
            None => call.await,
        }
    }

    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> ApiResponse<T> {
        let response = match self.send(method, path, body.as_ref(), auth).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Backend request failed");
                return ApiResponse::failure(FailureKind::Network, e.to_string());
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to read backend response body");
                return ApiResponse::failure(FailureKind::Network, e.to_string())
                    .with_status(status.as_u16());
            }
        };

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Required {
            return self.handle_unauthorized(&text).await;
        }

        if !status.is_success() {
            debug!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
        }

        normalize(status, &text)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        auth: Auth,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut request = self
            .inner
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        if auth == Auth::Required
            && let Some(token) = self.tokens.access_token().await
        {
            request = request.bearer_auth(token.expose_secret());
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await
    }

    /// A 401 on an auth-required call: refresh once, never replay.
    async fn handle_unauthorized<T: DeserializeOwned>(&self, body: &str) -> ApiResponse<T> {
        let Some(refresh_token) = self.tokens.refresh_token().await else {
            return normalize(StatusCode::UNAUTHORIZED, body);
        };

        match self.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.tokens.store(tokens).await;
                debug!("Access token refreshed");
                ApiResponse::retry_required().with_status(StatusCode::UNAUTHORIZED.as_u16())
            }
            Err(message) => {
                warn!(error = %message, "Token refresh failed, clearing tokens");
                self.tokens.clear().await;
                ApiResponse::failure(
                    FailureKind::Status,
                    "Your session has expired. Please log in again.",
                )
                .with_status(StatusCode::UNAUTHORIZED.as_u16())
            }
        }
    }

    /// Exchange the refresh token for a new pair.
    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenPair, String> {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        })
        .map_err(|e| e.to_string())?;

        let response = self
            .send(
                Method::POST,
                &Endpoint::RefreshToken.path(),
                Some(&body),
                Auth::Public,
            )
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;

        let refreshed = normalize::<RefreshedTokens>(status, &text)
            .into_result()
            .map_err(|e| e.to_string())?;

        Ok(TokenPair {
            access_token: SecretString::from(refreshed.access_token),
            refresh_token: refreshed
                .refresh_token
                .map(SecretString::from)
                .or_else(|| Some(refresh_token.clone())),
        })
    }
}

/// Normalize a backend response into an envelope.
///
/// - 2xx, empty body: success without data
/// - 2xx, `{ success: false, .. }`: rejected with the backend message
/// - 2xx, `{ success: true, data?, message? }`: unwrapped envelope
/// - 2xx, any other JSON: the body itself is the data
/// - non-2xx: status failure with the backend message, else its error, else a generic one
pub(crate) fn normalize<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResponse<T> {
    let code = status.as_u16();
    let body = body.trim();

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(backend_message)
            .unwrap_or_else(|| format!("Request failed with status {code}"));
        return ApiResponse::failure(FailureKind::Status, message).with_status(code);
    }

    if body.is_empty() {
        return ApiResponse::ok_empty().with_status(code);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Backend returned unparseable body");
            return ApiResponse::failure(FailureKind::InvalidResponse, e.to_string())
                .with_status(code);
        }
    };

    let Some(success) = value.get("success").and_then(Value::as_bool) else {
        return parse_data(value).with_status(code);
    };

    let message = backend_message(&value);

    if !success {
        return ApiResponse::failure(
            FailureKind::Rejected,
            message.unwrap_or_else(|| "Request failed".to_string()),
        )
        .with_status(code);
    }

    let response = match value.get("data") {
        None | Some(Value::Null) => ApiResponse::ok_empty(),
        Some(data) => parse_data(data.clone()),
    };

    if response.success {
        response.with_message(message).with_status(code)
    } else {
        response.with_status(code)
    }
}

fn parse_data<T: DeserializeOwned>(value: Value) -> ApiResponse<T> {
    match serde_json::from_value(value) {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            warn!(error = %e, "Backend data did not match the expected shape");
            ApiResponse::failure(FailureKind::InvalidResponse, e.to_string())
        }
    }
}

fn backend_message(value: &Value) -> Option<String> {
    ["message", "error"]
        .into_iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(String::from)
}
