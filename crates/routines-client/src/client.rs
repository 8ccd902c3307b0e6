//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::api::{HealthApi, RoutinesApi};
use crate::auth::{self, Anonymous, TokenProvider};
use crate::error::{Error, Result};

/// Default API address when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Routines API client.
///
/// Cheap to clone; clones share the connection pool and token provider.
///
/// # Example
///
/// ```no_run
/// use routines_client::{EnvToken, RoutinesClient};
///
/// # async fn example() -> routines_client::Result<()> {
/// let client = RoutinesClient::builder()
///     .base_url("http://127.0.0.1:8000")
///     .token_provider(EnvToken::new("ROUTINES_TOKEN"))
///     .build()?;
///
/// let routines = client.routines().list(Some(10)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RoutinesClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for RoutinesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutinesClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("tokens", &self.inner.tokens)
            .finish()
    }
}

/// Per-request options for [`RoutinesClient::request`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    headers: HeaderMap,
    body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Add a header. Overrides the default `Content-Type` when the name
    /// collides with it.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Use an already serialized body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as JSON.
    pub fn json<B: serde::Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        Ok(self.body(serde_json::to_string(body)?))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

impl RoutinesClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create an anonymous client pointing at the default local API.
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url(DEFAULT_BASE_URL).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the routines API.
    pub fn routines(&self) -> RoutinesApi {
        RoutinesApi::new(self.clone())
    }

    /// Access the health API.
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path. The path may carry a query string.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Send a request without credentials and decode the JSON response.
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.send(path, options, None).await
    }

    /// Send a request carrying a freshly acquired bearer token.
    ///
    /// The token provider is consulted on every call. When it has no token
    /// the `Authorization` header is left out entirely.
    pub async fn authenticated_request<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let bearer = auth::bearer_header(self.inner.tokens.as_ref()).await?;
        self.send(path, options, bearer).await
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
        bearer: Option<HeaderValue>,
    ) -> Result<T> {
        let url = self.url(path)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);
        if let Some(bearer) = bearer {
            headers.insert(AUTHORIZATION, bearer);
        }

        let mut request = self
            .inner
            .http
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(method = %options.method, path, status = status.as_u16(), "API request");

        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Request {
                status: status.as_u16(),
                message: resolve_error_message(&text, status),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Pick a human-readable message out of an error response body.
///
/// JSON bodies yield `detail`, then `message`, then the raw text. Non-JSON
/// bodies yield the raw text, or the status reason phrase when empty.
pub fn resolve_error_message(body: &str, status: StatusCode) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => truthy_field(&json, "detail")
            .or_else(|| truthy_field(&json, "message"))
            .unwrap_or_else(|| body.to_string()),
        Err(_) if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string(),
        Err(_) => body.to_string(),
    }
}

fn truthy_field(json: &serde_json::Value, key: &str) -> Option<String> {
    use serde_json::Value;

    match json.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builder for creating a [`RoutinesClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Some(DEFAULT_TIMEOUT),
            tokens: None,
        }
    }

    /// Set the base URL for the API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-request timeout. A zero duration disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Set where bearer tokens come from. Defaults to [`Anonymous`].
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.tokens = Some(Arc::new(provider));
        self
    }

    /// Share an existing provider.
    pub fn shared_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(provider);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RoutinesClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("routines-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RoutinesClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                tokens: self.tokens.unwrap_or_else(|| Arc::new(Anonymous)),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
