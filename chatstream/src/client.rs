//! HTTP client configuration for the chat-completions endpoint.

use crate::error::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;

/// Default chat-completions API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "CHATSTREAM_API_KEY";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "CHATSTREAM_BASE_URL";

/// Client for a chat-completions endpoint.
///
/// Holds no per-call state; every streamed exchange owns its own session.
///
/// # Example
///
/// ```rust,ignore
/// use chatstream::ChatClient;
///
/// // From the CHATSTREAM_API_KEY environment variable
/// let client = ChatClient::from_env()?;
///
/// // With explicit credential and custom endpoint
/// let client = ChatClient::builder()
///     .api_key("sk-...")
///     .base_url("https://my-proxy.example/v1")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct ChatClient {
    pub(crate) http_client: reqwest::Client,
    pub(crate) api_key: Arc<str>,
    pub(crate) base_url: Arc<str>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ChatClient {
    /// Create a new client with the given API key and the default base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key is empty or not a valid header
    /// value.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> ChatClientBuilder {
        ChatClientBuilder::default()
    }

    /// Create a client from the environment.
    ///
    /// Reads the credential from `CHATSTREAM_API_KEY` and an optional base
    /// URL override from `CHATSTREAM_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the credential variable is absent.
    /// This fails fast: no network call is ever attempted without one.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::config(format!("{API_KEY_ENV} environment variable not set")))?;

        let mut builder = Self::builder().api_key(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    /// Get the base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the authorization headers for API requests.
    pub(crate) fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::config("API key is not a valid header value"))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

/// Builder for [`ChatClient`].
#[derive(Debug, Default)]
pub struct ChatClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ChatClientBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom base URL.
    ///
    /// Useful for proxies and compatible local servers.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no API key is set or the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<ChatClient> {
        let api_key = match self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(Error::config("API key is required")),
        };
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut client_builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout_secs {
            client_builder = client_builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let http_client = client_builder
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(ChatClient {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}
