//! Pagination types and traits
//!
//! Defines the parameter model and the derivation traits used by all
//! strategies.

use crate::types::{JsonObject, JsonValue, PagedResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters used to request the next batch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchParameters {
    /// Absolute position plus page size
    Offset {
        /// Number of items to skip
        offset: u64,
        /// Page size
        limit: u32,
    },
    /// Opaque token from the most recent fetch plus page size
    Cursor {
        /// Cursor issued by the previous fetch, `None` for the first page
        cursor: Option<String>,
        /// Page size
        limit: u32,
    },
}

impl FetchParameters {
    /// Create offset parameters
    pub fn offset(offset: u64, limit: u32) -> Self {
        Self::Offset { offset, limit }
    }

    /// Create cursor parameters
    pub fn cursor(cursor: Option<String>, limit: u32) -> Self {
        Self::Cursor { cursor, limit }
    }

    /// Page size requested by these parameters
    pub fn limit(&self) -> u32 {
        match self {
            Self::Offset { limit, .. } | Self::Cursor { limit, .. } => *limit,
        }
    }

    /// Check if these are offset parameters
    pub fn is_offset(&self) -> bool {
        matches!(self, Self::Offset { .. })
    }

    /// Check if these are cursor parameters
    pub fn is_cursor(&self) -> bool {
        matches!(self, Self::Cursor { .. })
    }

    /// Render as request variables (GraphQL-style JSON object)
    ///
    /// An absent cursor is omitted rather than sent as `null`.
    pub fn to_variables(&self, names: &VariableNames) -> JsonObject {
        let mut vars = JsonObject::new();
        match self {
            Self::Offset { offset, limit } => {
                vars.insert(names.offset.clone(), JsonValue::from(*offset));
                vars.insert(names.limit.clone(), JsonValue::from(*limit));
            }
            Self::Cursor { cursor, limit } => {
                vars.insert(names.limit.clone(), JsonValue::from(*limit));
                if let Some(cursor) = cursor {
                    vars.insert(names.cursor.clone(), JsonValue::from(cursor.as_str()));
                }
            }
        }
        vars
    }

    /// Render as query string parameters
    pub fn to_query_params(&self, names: &VariableNames) -> HashMap<String, String> {
        self.to_variables(names)
            .into_iter()
            .map(|(key, value)| match value {
                JsonValue::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect()
    }
}

/// Names under which pagination parameters are sent to the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VariableNames {
    /// Variable name for the offset
    #[serde(default = "default_offset_name")]
    pub offset: String,
    /// Variable name for the page size
    #[serde(default = "default_limit_name")]
    pub limit: String,
    /// Variable name for the cursor
    #[serde(default = "default_cursor_name")]
    pub cursor: String,
}

fn default_offset_name() -> String {
    "offset".to_string()
}

fn default_limit_name() -> String {
    "limit".to_string()
}

fn default_cursor_name() -> String {
    "cursor".to_string()
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            offset: default_offset_name(),
            limit: default_limit_name(),
            cursor: default_cursor_name(),
        }
    }
}

impl VariableNames {
    /// Relay-style names (`first` / `after`)
    pub fn relay() -> Self {
        Self {
            offset: default_offset_name(),
            limit: "first".to_string(),
            cursor: "after".to_string(),
        }
    }
}

/// Stop conditions checked after every batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    /// Only the strategy's built-in checks apply
    Never,

    /// Stop when a batch is empty (no items)
    #[default]
    EmptyPage,

    /// Stop when the combined item count reaches the reported total
    TotalCount,

    /// Stop unless the batch explicitly reports `has_more = true`
    HasMoreFlag,
}

/// Result of checking a stop condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Continue pagination
    Continue,
    /// Stop pagination
    Stop,
}

impl StopResult {
    /// Check if we should continue
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if we should stop
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Derives the parameters for the next batch from the current result
///
/// Implementations must be pure: deriving twice from an unchanged result
/// yields identical parameters. Any `Fn(&PagedResult<T>) -> FetchParameters`
/// closure is a derivation.
pub trait DeriveParameters<T>: Send + Sync {
    /// Compute parameters for the batch after `current`
    fn derive(&self, current: &PagedResult<T>) -> FetchParameters;
}

impl<T, F> DeriveParameters<T> for F
where
    F: Fn(&PagedResult<T>) -> FetchParameters + Send + Sync,
{
    fn derive(&self, current: &PagedResult<T>) -> FetchParameters {
        self(current)
    }
}

/// A full paging policy: first-page parameters, derivation, and end detection
pub trait Paginator<T>: DeriveParameters<T> {
    /// Parameters for the first request
    fn initial_params(&self) -> FetchParameters;

    /// Whether paging is finished given the last batch and the combined result
    fn is_exhausted(&self, batch: &PagedResult<T>, combined: &PagedResult<T>) -> bool;

    /// Whether the next request is positioned by the number of items held
    ///
    /// Such a paginator only advances while the merge rule keeps the
    /// previous items.
    fn counts_held_items(&self) -> bool {
        false
    }
}

/// Check a stop condition against the last batch and the combined result
pub fn check_stop_condition<T>(
    condition: StopCondition,
    batch: &PagedResult<T>,
    combined: &PagedResult<T>,
) -> StopResult {
    let stop = match condition {
        StopCondition::Never => false,
        StopCondition::EmptyPage => batch.is_empty(),
        StopCondition::TotalCount => combined.reached_total(),
        StopCondition::HasMoreFlag => batch.has_more != Some(true),
    };

    if stop {
        StopResult::Stop
    } else {
        StopResult::Continue
    }
}
