//! Pagination module
//!
//! Supports: Offset, Cursor
//!
//! # Overview
//!
//! A strategy turns the current result into the parameters for the next
//! request and decides when paging is finished. Offset paging derives the
//! next position from the number of items held; cursor paging reuses the
//! opaque token returned by the most recent fetch.

mod strategies;
mod types;

pub use strategies::{CursorStrategy, OffsetStrategy, PaginationStrategy};
pub use types::{
    check_stop_condition, DeriveParameters, FetchParameters, Paginator, StopCondition,
    StopResult, VariableNames,
};

#[cfg(test)]
mod tests;
