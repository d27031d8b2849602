//! Error types for fetch-more
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Two categories matter to callers of the merger: fetch errors (anything
//! the fetch collaborator reports, see [`Error::is_fetch_error`]) and merge
//! errors ([`Error::Merge`]), raised when a merge rule fails.

use thiserror::Error;

/// The main error type for fetch-more
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("GraphQL errors: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error("Invalid response body: {message}")]
    InvalidResponse { message: String },

    #[error("Failed to extract items from path '{path}': {message}")]
    ItemExtraction { path: String, message: String },

    // ============================================================================
    // Merge Errors
    // ============================================================================
    #[error("Merge failed: {message}")]
    Merge { message: String },

    // ============================================================================
    // Paging Errors
    // ============================================================================
    #[error("No result loaded yet, call load_first before load_more")]
    NotLoaded,

    #[error("Pagination exhausted after {pages} pages")]
    Exhausted { pages: u32 },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a generic fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a merge error
    pub fn merge(message: impl Into<String>) -> Self {
        Self::Merge {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an item extraction error
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ItemExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the fetch collaborator
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::Fetch { .. }
                | Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::RateLimited { .. }
                | Error::Timeout { .. }
                | Error::InvalidUrl(_)
                | Error::GraphQl { .. }
                | Error::InvalidResponse { .. }
                | Error::ItemExtraction { .. }
        )
    }

    /// Reclassify an error raised by a fetch collaborator as a fetch error
    ///
    /// Fetch errors pass through unchanged; anything else a fetcher returns
    /// (application errors, a stray merge error) becomes [`Error::Fetch`].
    pub fn into_fetch_error(self) -> Self {
        if self.is_fetch_error() {
            self
        } else {
            Self::fetch(self.to_string())
        }
    }

    /// Whether this error came from a merge rule
    pub fn is_merge_error(&self) -> bool {
        matches!(self, Error::Merge { .. })
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for fetch-more
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
