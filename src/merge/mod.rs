//! Merge module
//!
//! Provides the incremental fetch-and-merge operation and the merge rules
//! it applies.
//!
//! # Overview
//!
//! - `IncrementalMerger` - derive parameters, fetch one batch, merge it
//! - `MergeRule` - pure `(previous, incoming) -> combined` transition
//! - `MergeStrategy` - built-in append / prepend / replace rules
//!
//! Merging is all-or-nothing: a failing rule yields `Error::Merge` and the
//! previous result is left as it was.

mod merger;
mod rules;

pub use merger::{apply_merge, fetch_next_batch, IncrementalMerger, MergedBatch};
pub use rules::{append, prepend, MergeRule, MergeStrategy};
