//! YAML Loader module
//!
//! Parse paginated source definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `SourceDefinition` - Declarative description of a paginated endpoint
//! - `PaginationDefinition` - Offset or cursor paging with its limit
//! - YAML parsing with validation, and conversion into a `Pager`

mod parser;
mod types;

pub use parser::{load_source, load_source_from_str};
pub use types::{HttpDefinition, HttpPager, PaginationDefinition, SourceDefinition};
