//! HTTP client with retry and backoff
//!
//! Provides the HTTP client the transport sits on:
//! - Automatic retries with configurable backoff
//! - Response body parsing
//! - Error classification for retry decisions

use crate::error::{is_retryable_status, Error, Result};
use crate::types::{BackoffType, QueryOptions, TransportMetadata};
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.dribbble.com";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: HashMap::new(),
            user_agent: format!("dribbble-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header("Authorization", value)
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Outcome of a single send
enum Attempt {
    Done(Result<Response>),
    Retry { error: Error, delay: Duration },
}

/// HTTP client with retry
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `url`, absolute or relative to the base URL, retrying transient
    /// failures with backoff
    pub async fn get(&self, url: &str, query: &QueryOptions) -> Result<Response> {
        let full_url = self.build_url(url);
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match self.attempt(&full_url, query, attempt, attempt < max_retries).await {
                Attempt::Done(result) => return result,
                Attempt::Retry { error, delay } => {
                    warn!(
                        %error,
                        attempt = attempt + 1,
                        attempts = max_retries + 1,
                        ?delay,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Send once; a retry is only proposed while `can_retry` holds
    async fn attempt(
        &self,
        url: &str,
        query: &QueryOptions,
        attempt: u32,
        can_retry: bool,
    ) -> Attempt {
        let mut request = self.client.get(url);
        for (key, value) in &self.config.default_headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                let error = Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                };
                return if can_retry {
                    Attempt::Retry {
                        error,
                        delay: self.calculate_backoff(attempt),
                    }
                } else {
                    Attempt::Done(Err(error))
                };
            }
            Err(e) if can_retry && e.is_connect() => {
                return Attempt::Retry {
                    error: Error::Http(e),
                    delay: self.calculate_backoff(attempt),
                };
            }
            Err(e) => return Attempt::Done(Err(Error::Http(e))),
        };

        let status = response.status();
        if can_retry && is_retryable_status(status.as_u16()) {
            let delay = match extract_retry_after(&response) {
                Some(after) if status == StatusCode::TOO_MANY_REQUESTS => {
                    after.min(self.config.max_backoff)
                }
                _ => self.calculate_backoff(attempt),
            };
            return Attempt::Retry {
                error: Error::http_status(status.as_u16(), ""),
                delay,
            };
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Attempt::Done(Err(Error::http_status(status.as_u16(), body)));
        }

        debug!(%url, status = status.as_u16(), "Request succeeded");
        Attempt::Done(Ok(response))
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Capture status, final URL and headers of a response
pub fn response_metadata(response: &Response) -> TransportMetadata {
    let mut metadata = TransportMetadata::new(response.url().as_str(), response.status().as_u16());
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            metadata
                .headers
                .insert(name.as_str().to_ascii_lowercase(), value.to_string());
        }
    }
    metadata
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}
