//! Loader types
//!
//! Declarative source definition types for YAML parsing.

use crate::error::Result;
use crate::http::{
    HttpClient, HttpClientConfig, HttpFetcher, RateLimiterConfig, RequestShape, ResponseMapping,
};
use crate::merge::MergeStrategy;
use crate::pagination::{
    CursorStrategy, OffsetStrategy, PaginationStrategy, StopCondition, VariableNames,
};
use crate::pager::{Pager, PagerConfig};
use crate::types::{BackoffType, JsonObject};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A pager backed by an HTTP source
pub type HttpPager<T> = Pager<T, HttpFetcher<T>, PaginationStrategy, MergeStrategy>;

// ============================================================================
// Source Definition
// ============================================================================

/// Top-level paginated source definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceDefinition {
    /// Source name
    pub name: String,
    /// Endpoint URL
    pub url: String,
    /// Request shape (graphql or query_params)
    pub request: RequestShape,
    /// Pagination configuration
    pub pagination: PaginationDefinition,
    /// How new batches are merged into the current result
    #[serde(default)]
    pub merge: MergeStrategy,
    /// Where items and metadata live in the response
    pub response: ResponseMapping,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpDefinition,
    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Variables sent with every request
    #[serde(default)]
    pub variables: JsonObject,
    /// Paging limits
    #[serde(default)]
    pub limits: PagerConfig,
}

impl SourceDefinition {
    /// Build the HTTP fetcher described by this definition
    pub fn build_fetcher<T>(&self) -> Result<HttpFetcher<T>> {
        let client = HttpClient::with_config(self.http.to_client_config())?;

        let mut fetcher = HttpFetcher::new(
            client,
            self.url.clone(),
            self.request.clone(),
            self.response.clone(),
        )
        .with_variable_names(self.pagination.variable_names().clone());

        for (key, value) in &self.headers {
            fetcher = fetcher.with_header(key, value);
        }
        for (key, value) in &self.variables {
            fetcher = fetcher.with_variable(key, value.clone());
        }

        Ok(fetcher)
    }

    /// Build a ready-to-use pager with nothing loaded
    pub fn into_pager<T>(self) -> Result<HttpPager<T>>
    where
        T: DeserializeOwned + Clone + Send + 'static,
    {
        let fetcher = self.build_fetcher()?;
        let pager = Pager::try_new(fetcher, self.pagination.strategy(), self.merge)?;
        Ok(pager.with_config(self.limits))
    }
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// Pagination definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationDefinition {
    /// Offset-based pagination
    Offset {
        /// Page size
        limit: u32,
        /// Stop condition
        #[serde(default)]
        stop_condition: StopCondition,
        /// Variable names
        #[serde(default)]
        variables: VariableNames,
    },
    /// Cursor-based pagination
    Cursor {
        /// Page size
        limit: u32,
        /// Stop condition
        #[serde(default)]
        stop_condition: StopCondition,
        /// Variable names
        #[serde(default)]
        variables: VariableNames,
    },
}

impl PaginationDefinition {
    /// Page size
    pub fn limit(&self) -> u32 {
        match self {
            Self::Offset { limit, .. } | Self::Cursor { limit, .. } => *limit,
        }
    }

    /// Variable names
    pub fn variable_names(&self) -> &VariableNames {
        match self {
            Self::Offset { variables, .. } | Self::Cursor { variables, .. } => variables,
        }
    }

    /// Build the strategy
    pub fn strategy(&self) -> PaginationStrategy {
        match self {
            Self::Offset {
                limit,
                stop_condition,
                ..
            } => OffsetStrategy::new(*limit)
                .with_stop_condition(*stop_condition)
                .into(),
            Self::Cursor {
                limit,
                stop_condition,
                ..
            } => CursorStrategy::new(*limit)
                .with_stop_condition(*stop_condition)
                .into(),
        }
    }
}

// ============================================================================
// HTTP Definition
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Backoff strategy between retries
    #[serde(default)]
    pub backoff: BackoffType,
    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            rate_limit: None,
            user_agent: None,
        }
    }
}

impl HttpDefinition {
    /// Convert into client configuration
    pub fn to_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .backoff(
                self.backoff,
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            );
        if let Some(rate_limit) = self.rate_limit {
            builder = builder.rate_limit(rate_limit);
        }
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    30_000
}
