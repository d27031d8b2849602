//! Common types used throughout fetch-more
//!
//! This module contains the paged result model plus shared type aliases
//! and small enums used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Paged Result
// ============================================================================

/// An aggregate of fetched items plus optional pagination metadata
///
/// A `PagedResult` is produced by an initial fetch and then superseded by
/// every merge. The same type describes a single fetched batch and the
/// accumulated result, so merge rules combine two values of one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PagedResult<T> {
    /// Items fetched so far, in caller-defined order
    pub items: Vec<T>,
    /// Opaque cursor issued by the most recent fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Total number of items the source reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// Whether the source reports more items after this batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            total_count: None,
            has_more: None,
        }
    }
}

impl<T> PagedResult<T> {
    /// Create a result holding the given items and no metadata
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Create an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the cursor
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Set the total count
    #[must_use]
    pub fn with_total_count(mut self, total: u64) -> Self {
        self.total_count = Some(total);
        self
    }

    /// Set the has-more flag
    #[must_use]
    pub fn with_has_more(mut self, has_more: bool) -> Self {
        self.has_more = Some(has_more);
        self
    }

    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are held
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the source reported that nothing follows this result
    pub fn reports_end(&self) -> bool {
        self.has_more == Some(false)
    }

    /// Whether the item count has reached the reported total
    pub fn reached_total(&self) -> bool {
        self.total_count
            .is_some_and(|total| self.items.len() as u64 >= total)
    }

    /// Map items into another type, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            cursor: self.cursor,
            total_count: self.total_count,
            has_more: self.has_more,
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy used by the HTTP client between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
