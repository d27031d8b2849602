//! Response mapping
//!
//! Turns a JSON response body into a [`PagedResult`] by following dot
//! paths to the items and the pagination metadata.

use crate::error::{Error, Result};
use crate::types::{JsonValue, PagedResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Where to find items and metadata in a response
///
/// Paths are dot separated (`users.pageInfo.endCursor`), may start with
/// `$.`, and may contain array indexes (`edges.-1.cursor` for the last edge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResponseMapping {
    /// Path to the array of items
    pub items_path: String,
    /// Path inside each item to unwrap (e.g. `node` for Relay edges)
    #[serde(default)]
    pub item_path: Option<String>,
    /// Path to the cursor for the next page
    #[serde(default)]
    pub cursor_path: Option<String>,
    /// Path to the total item count
    #[serde(default)]
    pub total_path: Option<String>,
    /// Path to a has-more flag
    #[serde(default)]
    pub has_more_path: Option<String>,
}

impl ResponseMapping {
    /// Map items found at `items_path`, with no metadata
    pub fn new(items_path: impl Into<String>) -> Self {
        Self {
            items_path: items_path.into(),
            item_path: None,
            cursor_path: None,
            total_path: None,
            has_more_path: None,
        }
    }

    /// Relay connection layout under `connection`
    ///
    /// Items come from `edges[].node`, the cursor from
    /// `pageInfo.endCursor` and the flag from `pageInfo.hasNextPage`.
    pub fn relay(connection: &str) -> Self {
        Self {
            items_path: format!("{connection}.edges"),
            item_path: Some("node".to_string()),
            cursor_path: Some(format!("{connection}.pageInfo.endCursor")),
            total_path: Some(format!("{connection}.totalCount")),
            has_more_path: Some(format!("{connection}.pageInfo.hasNextPage")),
        }
    }

    /// Set the per-item path
    #[must_use]
    pub fn with_item_path(mut self, path: impl Into<String>) -> Self {
        self.item_path = Some(path.into());
        self
    }

    /// Set the cursor path
    #[must_use]
    pub fn with_cursor_path(mut self, path: impl Into<String>) -> Self {
        self.cursor_path = Some(path.into());
        self
    }

    /// Set the total count path
    #[must_use]
    pub fn with_total_path(mut self, path: impl Into<String>) -> Self {
        self.total_path = Some(path.into());
        self
    }

    /// Set the has-more path
    #[must_use]
    pub fn with_has_more_path(mut self, path: impl Into<String>) -> Self {
        self.has_more_path = Some(path.into());
        self
    }

    /// Extract a batch from a response body
    pub fn extract<T: DeserializeOwned>(&self, root: &JsonValue) -> Result<PagedResult<T>> {
        let items = match lookup_path(root, &self.items_path) {
            Some(JsonValue::Array(items)) => items,
            Some(JsonValue::Null) | None => {
                return Err(Error::extraction(&self.items_path, "path not found"))
            }
            Some(other) => {
                return Err(Error::extraction(
                    &self.items_path,
                    format!("expected an array, found {}", type_name(other)),
                ))
            }
        };

        let items = items
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let raw = match &self.item_path {
                    Some(path) => lookup_path(raw, path).ok_or_else(|| {
                        Error::extraction(path, format!("missing in item {index}"))
                    })?,
                    None => raw,
                };
                T::deserialize(raw).map_err(|e| {
                    Error::extraction(&self.items_path, format!("item {index}: {e}"))
                })
            })
            .collect::<Result<Vec<T>>>()?;

        let cursor = self
            .cursor_path
            .as_deref()
            .and_then(|path| lookup_path(root, path))
            .and_then(scalar_to_string);

        let total_count = self
            .total_path
            .as_deref()
            .and_then(|path| lookup_path(root, path))
            .and_then(|v| match v {
                JsonValue::Number(n) => n.as_u64(),
                JsonValue::String(s) => s.parse().ok(),
                _ => None,
            });

        let has_more = self
            .has_more_path
            .as_deref()
            .and_then(|path| lookup_path(root, path))
            .and_then(JsonValue::as_bool);

        Ok(PagedResult {
            items,
            cursor,
            total_count,
            has_more,
        })
    }
}

/// Follow a dot path through objects and arrays
///
/// Negative indexes count from the end of an array.
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    path.split('.').try_fold(value, |current, part| match current {
        JsonValue::Object(map) => map.get(part),
        JsonValue::Array(items) => {
            let index: i64 = part.parse().ok()?;
            let index = if index < 0 {
                items.len().checked_sub(index.unsigned_abs() as usize)?
            } else {
                index as usize
            };
            items.get(index)
        }
        _ => None,
    })
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
