//! Bearer token storage.
//!
//! The API client never owns tokens directly; it reads and writes them
//! through a [`TokenStore`]. The storefront uses [`SessionTokenStore`] so each
//! visitor's tokens live in their session. Tools and tests use
//! [`MemoryTokenStore`].

use std::fmt;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tower_sessions::Session;

use crate::models::{CurrentCustomer, StoredTokens, session_keys};

/// Access token plus optional refresh token.
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

impl TokenPair {
    /// Build a pair from plain strings.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: refresh_token.map(SecretString::from),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Where the API client keeps bearer tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, if any.
    async fn access_token(&self) -> Option<SecretString>;

    /// Current refresh token, if any.
    async fn refresh_token(&self) -> Option<SecretString>;

    /// Replace the stored pair.
    async fn store(&self, tokens: TokenPair);

    /// Forget both tokens.
    async fn clear(&self);
}

/// Process-local token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a pair.
    #[must_use]
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Option<SecretString> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    async fn refresh_token(&self) -> Option<SecretString> {
        self.tokens
            .read()
            .await
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
    }

    async fn store(&self, tokens: TokenPair) {
        *self.tokens.write().await = Some(tokens);
    }

    async fn clear(&self) {
        *self.tokens.write().await = None;
    }
}

/// Token store backed by the visitor's session.
#[derive(Clone)]
pub struct SessionTokenStore {
    session: Session,
}

impl SessionTokenStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    async fn load(&self) -> Option<StoredTokens> {
        match self.session.get::<StoredTokens>(session_keys::TOKENS).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!("Failed to read tokens from session: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl TokenStore for SessionTokenStore {
    async fn access_token(&self) -> Option<SecretString> {
        self.load()
            .await
            .map(|t| SecretString::from(t.access_token))
    }

    async fn refresh_token(&self) -> Option<SecretString> {
        self.load()
            .await
            .and_then(|t| t.refresh_token)
            .map(SecretString::from)
    }

    async fn store(&self, tokens: TokenPair) {
        let stored = StoredTokens {
            access_token: tokens.access_token.expose_secret().to_string(),
            refresh_token: tokens
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
        };
        if let Err(e) = self.session.insert(session_keys::TOKENS, stored).await {
            tracing::warn!("Failed to store tokens in session: {e}");
        }
    }

    /// Without tokens the visitor is logged out, so the identity goes too.
    async fn clear(&self) {
        if let Err(e) = self
            .session
            .remove::<StoredTokens>(session_keys::TOKENS)
            .await
        {
            tracing::warn!("Failed to clear tokens from session: {e}");
        }
        if let Err(e) = self
            .session
            .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await
        {
            tracing::warn!("Failed to clear customer from session: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.access_token().await.is_none());

        store
            .store(TokenPair::new("access", Some("refresh".to_string())))
            .await;
        assert_eq!(
            store.access_token().await.map(|t| t.expose_secret().to_string()),
            Some("access".to_string())
        );
        assert_eq!(
            store.refresh_token().await.map(|t| t.expose_secret().to_string()),
            Some("refresh".to_string())
        );

        store.clear().await;
        assert!(store.access_token().await.is_none());
        assert!(store.refresh_token().await.is_none());
    }

    #[test]
    fn test_token_pair_debug_redacts() {
        let pair = TokenPair::new("very-secret-access", Some("very-secret-refresh".into()));
        let debug = format!("{pair:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
