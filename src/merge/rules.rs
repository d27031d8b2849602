//! Merge rules
//!
//! A merge rule is a pure state transition from (previous, incoming) to a
//! new combined result. Both inputs are borrowed, so a rule cannot alter
//! the result it was given.

use crate::error::Result;
use crate::types::PagedResult;
use serde::{Deserialize, Serialize};

/// Combines the current result with a freshly fetched batch
///
/// Any `Fn(&PagedResult<T>, &PagedResult<T>) -> Result<PagedResult<T>>`
/// closure is a merge rule.
pub trait MergeRule<T>: Send + Sync {
    /// Produce the combined result
    fn merge(&self, previous: &PagedResult<T>, incoming: &PagedResult<T>)
        -> Result<PagedResult<T>>;

    /// Whether the combined result still holds the previous items
    fn keeps_previous(&self) -> bool {
        true
    }
}

impl<T, F> MergeRule<T> for F
where
    F: Fn(&PagedResult<T>, &PagedResult<T>) -> Result<PagedResult<T>> + Send + Sync,
{
    fn merge(
        &self,
        previous: &PagedResult<T>,
        incoming: &PagedResult<T>,
    ) -> Result<PagedResult<T>> {
        self(previous, incoming)
    }
}

/// Built-in merge rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// New items after old (offset paging)
    #[default]
    Append,
    /// New items before old (reverse-chronological cursor paging)
    Prepend,
    /// Keep only the new batch
    Replace,
}

impl<T: Clone> MergeRule<T> for MergeStrategy {
    fn merge(
        &self,
        previous: &PagedResult<T>,
        incoming: &PagedResult<T>,
    ) -> Result<PagedResult<T>> {
        let items = match self {
            Self::Append => append_items(&previous.items, &incoming.items),
            Self::Prepend => append_items(&incoming.items, &previous.items),
            Self::Replace => incoming.items.clone(),
        };

        Ok(PagedResult {
            items,
            cursor: incoming.cursor.clone(),
            total_count: incoming.total_count.or(previous.total_count),
            has_more: incoming.has_more,
        })
    }

    fn keeps_previous(&self) -> bool {
        !matches!(self, Self::Replace)
    }
}

fn append_items<T: Clone>(first: &[T], second: &[T]) -> Vec<T> {
    let mut items = Vec::with_capacity(first.len() + second.len());
    items.extend_from_slice(first);
    items.extend_from_slice(second);
    items
}

/// Append rule as a plain function
pub fn append<T: Clone>(
    previous: &PagedResult<T>,
    incoming: &PagedResult<T>,
) -> Result<PagedResult<T>> {
    MergeStrategy::Append.merge(previous, incoming)
}

/// Prepend rule as a plain function
pub fn prepend<T: Clone>(
    previous: &PagedResult<T>,
    incoming: &PagedResult<T>,
) -> Result<PagedResult<T>> {
    MergeStrategy::Prepend.merge(previous, incoming)
}
