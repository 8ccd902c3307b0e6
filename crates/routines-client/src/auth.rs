//! Bearer token acquisition.
//!
//! The identity provider is anything that can asynchronously hand out an
//! optional bearer token. The client asks for a token right before every
//! authenticated request and never keeps it around, so providers are free to
//! rotate or expire tokens between calls.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderValue;

use crate::error::{Error, Result, TokenError};

// ─────────────────────────────────────────────────────────────────────────────
// TokenProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Source of short-lived bearer tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// Fetch the current token.
    ///
    /// `Ok(None)` means the caller is not signed in.
    async fn token(&self) -> std::result::Result<Option<String>, TokenError>;
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn token(&self) -> std::result::Result<Option<String>, TokenError> {
        (**self).token().await
    }
}

/// Provider for signed-out callers. Never yields a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl TokenProvider for Anonymous {
    async fn token(&self) -> std::result::Result<Option<String>, TokenError> {
        Ok(None)
    }
}

/// A fixed token, mostly useful for scripts and tests.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken").field(&"<redacted>").finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> std::result::Result<Option<String>, TokenError> {
        Ok(non_empty(&self.0))
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the environment variable being read.
    pub fn var(&self) -> &str {
        &self.var
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn token(&self) -> std::result::Result<Option<String>, TokenError> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(non_empty(&value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(TokenError::new(format!("{}: {}", self.var, e))),
        }
    }
}

/// Reads the token from a file on every call.
///
/// A missing file means "signed out". Whatever writes the file (a login
/// helper, a sidecar refreshing credentials) may replace it at any time.
#[derive(Debug, Clone)]
pub struct FileToken {
    path: PathBuf,
}

impl FileToken {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenProvider for FileToken {
    async fn token(&self) -> std::result::Result<Option<String>, TokenError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(non_empty(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TokenError::new(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Header construction
// ─────────────────────────────────────────────────────────────────────────────

/// Ask the provider for a token and turn it into an `Authorization` value.
///
/// Provider failures degrade to `None`; the server will then reject the
/// request with 401 if the endpoint needs a signed-in caller.
pub(crate) async fn bearer_header(provider: &dyn TokenProvider) -> Result<Option<HeaderValue>> {
    let token = match provider.token().await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "Token provider failed, sending request without credentials");
            None
        }
    };

    match token {
        Some(token) => {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Auth("token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl TokenProvider for Failing {
        async fn token(&self) -> std::result::Result<Option<String>, TokenError> {
            Err(TokenError::new("session expired"))
        }
    }

    #[tokio::test]
    async fn test_static_token_header() {
        let header = bearer_header(&StaticToken::new("abc")).await.unwrap().unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc");
        assert!(header.is_sensitive());
    }

    #[tokio::test]
    async fn test_blank_static_token_is_no_token() {
        assert!(bearer_header(&StaticToken::new("  ")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_anonymous_has_no_header() {
        assert!(bearer_header(&Anonymous).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failing_provider_degrades_to_anonymous() {
        assert!(bearer_header(&Failing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_token_is_auth_error() {
        let err = bearer_header(&StaticToken::new("bad\ntoken")).await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_file_token_is_reread_each_call() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        let provider = FileToken::new(&path);

        assert_eq!(provider.token().await.unwrap(), None);

        std::fs::write(&path, "first\n").unwrap();
        assert_eq!(provider.token().await.unwrap().as_deref(), Some("first"));

        std::fs::write(&path, "second").unwrap();
        assert_eq!(provider.token().await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_env_token_missing_var() {
        let provider = EnvToken::new("ROUTINES_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert_eq!(provider.token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_env_token_is_reread_each_call() {
        const VAR: &str = "ROUTINES_TEST_TOKEN_ROTATION";
        let provider = EnvToken::new(VAR);

        // SAFETY: Test context, variable unique to this test
        unsafe { std::env::set_var(VAR, "first") };
        assert_eq!(provider.token().await.unwrap().as_deref(), Some("first"));

        unsafe { std::env::set_var(VAR, " second \n") };
        assert_eq!(provider.token().await.unwrap().as_deref(), Some("second"));

        unsafe { std::env::remove_var(VAR) };
        assert_eq!(provider.token().await.unwrap(), None);
    }
}
