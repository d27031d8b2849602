// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # fetch-more
//!
//! Incremental "fetch more" pagination: load a first page, then keep
//! fetching the next batch and merging it into what is already held.
//!
//! ## Features
//!
//! - **Two pagination modes**: Offset (`offset = items held`) and cursor
//!   (`cursor = last fetch's end cursor`)
//! - **Pluggable merge rules**: Append, prepend, replace, or any closure
//! - **Non-mutating merges**: The previous result is never touched
//! - **Pager**: Load first / load more / load all, with page and item limits
//! - **HTTP sources**: GraphQL or query-string endpoints with retry, backoff
//!   and rate limiting, declared in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fetch_more::{load_source, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut pager = load_source("sources/issues.yaml")?
//!         .into_pager::<serde_json::Value>()?;
//!
//!     pager.load_first().await?;
//!     while !pager.is_exhausted() {
//!         let combined = pager.load_more().await?;
//!         println!("{} items so far", combined.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                              Pager                              │
//! │  load_first()   load_more()   load_all()   into_stream()        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬──────────────────────────┐
//! │  Pagination  │   IncrementalMerger   │     Merge rules          │
//! ├──────────────┼───────────────────────┼──────────────────────────┤
//! │ Offset       │ derive → fetch →      │ Append                   │
//! │ Cursor       │ merge(prev, batch)    │ Prepend / Replace        │
//! │ Stop checks  │                       │ Closures                 │
//! └──────────────┴───────────┬───────────┴──────────────────────────┘
//!                            │ Fetcher
//! ┌──────────────────────────┴──────────────────────────────────────┐
//! │  HttpFetcher: GraphQL / query params, retry, backoff, rate limit │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Paged results and common type aliases
pub mod types;

/// Offset and cursor pagination strategies
pub mod pagination;

/// The fetch collaborator trait
pub mod fetch;

/// Merge rules and the incremental merger
pub mod merge;

/// Stateful pager built on the merger
pub mod pager;

/// HTTP client, response mapping and HTTP fetcher
pub mod http;

/// YAML loader for source definitions
pub mod loader;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use fetch::{Fetcher, FnFetcher};
pub use loader::{load_source, load_source_from_str, HttpPager, SourceDefinition};
pub use merge::{
    apply_merge, fetch_next_batch, IncrementalMerger, MergeRule, MergeStrategy, MergedBatch,
};
pub use pager::{Pager, PagerConfig, PagerStats, SharedPager};
pub use pagination::{
    CursorStrategy, DeriveParameters, FetchParameters, OffsetStrategy, PaginationStrategy,
    Paginator, StopCondition,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
