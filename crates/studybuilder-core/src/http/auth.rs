//! Authentication handling for the StudyBuilder API
//!
//! The gateway asks an [`AuthProvider`] for a bearer token before every
//! request. When no token is available the provider's cached state is
//! cleared so the next request starts a fresh acquisition.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::Result;

/// Source of bearer tokens for outbound requests
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the current access token, `None` when unauthenticated
    async fn access_token(&self) -> Result<Option<String>>;

    /// Invalidate any cached credentials
    fn clear(&self);
}

/// Provider that never authenticates
#[derive(Debug, Clone, Default)]
pub struct NoAuth;

#[async_trait]
impl AuthProvider for NoAuth {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn clear(&self) {}
}

/// Bearer token provider backed by a literal token or an environment variable
///
/// Tokens read from the environment are cached until [`AuthProvider::clear`]
/// is called; the variable is read again on the next acquisition.
#[derive(Debug, Default)]
pub struct TokenAuth {
    token: RwLock<Option<String>>,
    env_var: Option<String>,
}

impl TokenAuth {
    /// Create with an explicit token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            env_var: None,
        }
    }

    /// Create a provider that reads its token from an environment variable
    pub fn from_env(var: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(None),
            env_var: Some(var.into()),
        }
    }

    /// Whether a token is currently cached
    pub fn is_cached(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    fn read_env(&self) -> Option<String> {
        let var = self.env_var.as_ref()?;
        std::env::var(var).ok().filter(|value| !value.trim().is_empty())
    }
}

#[async_trait]
impl AuthProvider for TokenAuth {
    async fn access_token(&self) -> Result<Option<String>> {
        if let Some(token) = self.token.read().unwrap_or_else(|e| e.into_inner()).clone() {
            return Ok(Some(token));
        }

        let fresh = self.read_env();
        if fresh.is_some() {
            let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
            *guard = fresh.clone();
        }
        Ok(fresh)
    }

    fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_literal_token() {
        let auth = TokenAuth::new("abc123");
        assert_eq!(auth.access_token().await.unwrap().as_deref(), Some("abc123"));
        assert!(auth.is_cached());
    }

    #[tokio::test]
    async fn test_clear_drops_literal_token() {
        let auth = TokenAuth::new("abc123");
        auth.clear();
        assert!(!auth.is_cached());
        assert_eq!(auth.access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_env_token_is_reacquired_after_clear() {
        let var = "STUDYBUILDER_TEST_TOKEN_REACQUIRE";
        std::env::set_var(var, "first");

        let auth = TokenAuth::from_env(var);
        assert_eq!(auth.access_token().await.unwrap().as_deref(), Some("first"));

        std::env::set_var(var, "second");
        // Cached until cleared
        assert_eq!(auth.access_token().await.unwrap().as_deref(), Some("first"));

        auth.clear();
        assert_eq!(auth.access_token().await.unwrap().as_deref(), Some("second"));

        std::env::remove_var(var);
    }

    #[tokio::test]
    async fn test_blank_env_token_is_ignored() {
        let var = "STUDYBUILDER_TEST_TOKEN_BLANK";
        std::env::set_var(var, "  ");

        let auth = TokenAuth::from_env(var);
        assert_eq!(auth.access_token().await.unwrap(), None);

        std::env::remove_var(var);
    }

    #[tokio::test]
    async fn test_no_auth() {
        assert_eq!(NoAuth.access_token().await.unwrap(), None);
    }
}
