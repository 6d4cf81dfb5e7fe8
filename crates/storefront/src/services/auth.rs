//! Customer authentication against the backend.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use tracing::instrument;

use lensway_core::UserId;

use crate::api::{ApiClient, ApiError, Auth, Endpoint, TokenPair};
use crate::models::CurrentCustomer;

/// Login credentials.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// Registration details.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// A customer as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: UserId,
    pub email: String,
    #[serde(default, alias = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Customer {
    /// Display name: explicit name, else first and last name joined.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.to_string());
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Identity kept in the session.
    #[must_use]
    pub fn to_current(&self) -> CurrentCustomer {
        CurrentCustomer {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.display_name(),
        }
    }
}

/// Body of a successful login or registration.
#[derive(Deserialize)]
pub struct AuthSession {
    #[serde(default, alias = "accessToken", alias = "token")]
    access_token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
    #[serde(alias = "customer")]
    pub user: Customer,
}

impl AuthSession {
    /// Token pair, when the backend issued one.
    #[must_use]
    pub fn tokens(&self) -> Option<TokenPair> {
        self.access_token
            .clone()
            .map(|access| TokenPair::new(access, self.refresh_token.clone()))
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Log in.
///
/// # Errors
///
/// Returns the backend failure (401 for bad credentials).
#[instrument(skip(api, request), fields(email = %request.email))]
pub async fn login(api: &ApiClient, request: &LoginRequest) -> Result<AuthSession, ApiError> {
    api.post(&Endpoint::Login.path(), request, Auth::Public)
        .await
        .into_result()
}

/// Create an account.
///
/// # Errors
///
/// Returns the backend failure (e.g. 409 when the email is taken).
#[instrument(skip(api, request), fields(email = %request.email))]
pub async fn register(
    api: &ApiClient,
    request: &RegisterRequest,
) -> Result<AuthSession, ApiError> {
    api.post(&Endpoint::Register.path(), request, Auth::Public)
        .await
        .into_result()
}

/// Tell the backend the session ended.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api))]
pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    api.post::<_, serde_json::Value>(&Endpoint::Logout.path(), &serde_json::json!({}), Auth::Required)
        .await
        .into_unit()
}

/// Fetch the logged-in customer.
///
/// # Errors
///
/// Returns the backend failure.
#[instrument(skip(api))]
pub async fn me(api: &ApiClient) -> Result<Customer, ApiError> {
    api.get(&Endpoint::CurrentUser.path(), Auth::Required)
        .await
        .into_result()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_session_aliases() {
        let session: AuthSession = serde_json::from_value(serde_json::json!({
            "token": "abc",
            "refreshToken": "def",
            "customer": {"id": 12, "email": "ada@example.com", "firstName": "Ada", "lastName": "Lovelace"}
        }))
        .unwrap();

        let tokens = session.tokens().unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "abc");
        assert_eq!(
            tokens.refresh_token.unwrap().expose_secret(),
            "def"
        );
        assert_eq!(session.user.display_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(session.user.to_current().id.as_str(), "12");
    }

    #[test]
    fn test_login_request_serializes_password() {
        let request = LoginRequest {
            email: "ada@example.com".into(),
            password: SecretString::from("hunter22"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["password"], "hunter22");
        assert!(!format!("{request:?}").contains("hunter22"));
    }
}
