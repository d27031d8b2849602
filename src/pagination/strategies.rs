//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{
    check_stop_condition, DeriveParameters, FetchParameters, Paginator, StopCondition,
};
use crate::types::PagedResult;

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination (e.g., SQL-style `offset` / `limit`)
///
/// The next offset is the number of items already held. If the remote
/// collection gains or loses items between fetches, absolute positions
/// shift and pages overlap (duplicates) or leave gaps (skips). Nothing here
/// tries to repair that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetStrategy {
    /// Number of items per page
    pub limit: u32,
    /// Stop condition
    pub stop_condition: StopCondition,
}

impl OffsetStrategy {
    /// Create a new offset strategy
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Set stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }
}

impl<T> DeriveParameters<T> for OffsetStrategy {
    fn derive(&self, current: &PagedResult<T>) -> FetchParameters {
        FetchParameters::offset(current.len() as u64, self.limit)
    }
}

impl<T> Paginator<T> for OffsetStrategy {
    fn initial_params(&self) -> FetchParameters {
        FetchParameters::offset(0, self.limit)
    }

    fn is_exhausted(&self, batch: &PagedResult<T>, combined: &PagedResult<T>) -> bool {
        if batch.reports_end() || combined.reached_total() {
            return true;
        }

        // A short page means the source ran out
        if batch.len() < self.limit as usize {
            return true;
        }

        check_stop_condition(self.stop_condition, batch, combined).should_stop()
    }

    fn counts_held_items(&self) -> bool {
        true
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (e.g., Relay `after`, Stripe `starting_after`)
///
/// The cursor is read from the most recent fetch, never recomputed from the
/// item count, so positions stay stable when the remote set changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorStrategy {
    /// Number of items per page
    pub limit: u32,
    /// Stop condition
    pub stop_condition: StopCondition,
}

impl CursorStrategy {
    /// Create a new cursor strategy
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Set stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }
}

impl<T> DeriveParameters<T> for CursorStrategy {
    fn derive(&self, current: &PagedResult<T>) -> FetchParameters {
        FetchParameters::cursor(current.cursor.clone(), self.limit)
    }
}

impl<T> Paginator<T> for CursorStrategy {
    fn initial_params(&self) -> FetchParameters {
        FetchParameters::cursor(None, self.limit)
    }

    fn is_exhausted(&self, batch: &PagedResult<T>, combined: &PagedResult<T>) -> bool {
        if batch.reports_end() {
            return true;
        }

        // No token, no next page
        match combined.cursor.as_deref() {
            None | Some("") => return true,
            Some(_) => {}
        }

        check_stop_condition(self.stop_condition, batch, combined).should_stop()
    }
}

// ============================================================================
// Either
// ============================================================================

/// Runtime choice between the offset and cursor strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Offset-based
    Offset(OffsetStrategy),
    /// Cursor-based
    Cursor(CursorStrategy),
}

impl From<OffsetStrategy> for PaginationStrategy {
    fn from(strategy: OffsetStrategy) -> Self {
        Self::Offset(strategy)
    }
}

impl From<CursorStrategy> for PaginationStrategy {
    fn from(strategy: CursorStrategy) -> Self {
        Self::Cursor(strategy)
    }
}

impl<T> DeriveParameters<T> for PaginationStrategy {
    fn derive(&self, current: &PagedResult<T>) -> FetchParameters {
        match self {
            Self::Offset(s) => s.derive(current),
            Self::Cursor(s) => s.derive(current),
        }
    }
}

impl<T> Paginator<T> for PaginationStrategy {
    fn initial_params(&self) -> FetchParameters {
        match self {
            Self::Offset(s) => Paginator::<T>::initial_params(s),
            Self::Cursor(s) => Paginator::<T>::initial_params(s),
        }
    }

    fn is_exhausted(&self, batch: &PagedResult<T>, combined: &PagedResult<T>) -> bool {
        match self {
            Self::Offset(s) => s.is_exhausted(batch, combined),
            Self::Cursor(s) => s.is_exhausted(batch, combined),
        }
    }

    fn counts_held_items(&self) -> bool {
        matches!(self, Self::Offset(_))
    }
}
