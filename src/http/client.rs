//! HTTP client with retry and rate limiting
//!
//! This is the transport behind [`HttpFetcher`](super::HttpFetcher). It
//! owns the retry policy, so the merger above it never retries:
//! - Retries of transient failures, spaced by a [`RetryPolicy`]
//! - `Retry-After` handling for 429 responses
//! - Optional token bucket rate limiting

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue};
use reqwest::{Client, Method, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Retry Policy
// ============================================================================

/// How often and how far apart failed requests are repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Growth of the delay between attempts
    pub backoff: BackoffType,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Delay ceiling
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffType::Exponential,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt + 1`
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempt` retries
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Retry policy
    pub retry: RetryPolicy,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("fetch-more/{}", env!("CARGO_PKG_VERSION")),
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
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the whole retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.retry.max_retries = retries;
        self
    }

    /// Set backoff shape and bounds
    pub fn backoff(mut self, backoff: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.retry.backoff = backoff;
        self.config.retry.initial_delay = initial;
        self.config.retry.max_delay = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
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

/// Query, headers and body of a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
}

impl RequestConfig {
    /// Empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// Client
// ============================================================================

/// Outcome of one attempt
enum Attempt {
    Done(Response),
    /// Worth repeating; `wait` overrides the policy delay
    Transient { error: Error, wait: Option<Duration> },
    Fatal(Error),
}

/// HTTP client with retry and rate limiting
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Retry policy in use
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.config.retry
    }

    /// Whether requests go through a rate limiter
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Make a request, retrying transient failures
    ///
    /// When retries run out the last failure is returned as is.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
    ) -> Result<Response> {
        let policy = self.config.retry;
        let mut attempt = 0;

        loop {
            let (error, wait) = match self.send_once(&method, url, config).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Transient { error, wait } => (error, wait),
            };

            if !policy.allows(attempt) {
                return Err(error);
            }

            let delay = wait.unwrap_or_else(|| policy.delay(attempt));
            warn!(
                "{} {} failed ({error}), attempt {}/{}, retrying in {:?}",
                method,
                url,
                attempt + 1,
                policy.max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Make a request and parse the JSON response
    ///
    /// A body that is not JSON is a fetch failure
    /// ([`Error::InvalidResponse`]), whatever the status was.
    pub async fn request_json(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
    ) -> Result<JsonValue> {
        let response = self.request(method.clone(), url, config).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("{} {} returned a body that is not JSON: {e}", method, url);
            Error::InvalidResponse {
                message: e.to_string(),
            }
        })
    }

    async fn send_once(&self, method: &Method, url: &str, config: &RequestConfig) -> Attempt {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.request(method.clone(), url);
        for (key, value) in self.config.default_headers.iter().chain(&config.headers) {
            req = req.header(key.as_str(), value.as_str());
        }
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(body) = &config.body {
            req = req.json(body);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Transient {
                    error: Error::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    },
                    wait: None,
                }
            }
            Err(e) if e.is_connect() => {
                return Attempt::Transient {
                    error: Error::Http(e),
                    wait: None,
                }
            }
            Err(e) => return Attempt::Fatal(Error::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            debug!("{} {} -> {}", method, url, status);
            return Attempt::Done(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let seconds = retry_after_seconds(&response);
            return Attempt::Transient {
                error: Error::RateLimited {
                    retry_after_seconds: seconds,
                },
                wait: Some(Duration::from_secs(seconds)),
            };
        }

        let body = response.text().await.unwrap_or_default();
        let error = Error::http_status(status.as_u16(), body);
        if error.is_retryable() {
            Attempt::Transient { error, wait: None }
        } else {
            Attempt::Fatal(error)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// `Retry-After` in seconds, one second when absent or unparseable
fn retry_after_seconds(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1)
}
