//! Pager types
//!
//! Configuration and statistics for a paging session.

use serde::{Deserialize, Serialize};

/// Limits applied to a paging session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PagerConfig {
    /// Stop after this many pages (0 = unlimited)
    #[serde(default)]
    pub max_pages: u32,
    /// Stop once the combined result holds this many items (0 = unlimited)
    #[serde(default)]
    pub max_items: usize,
}

impl PagerConfig {
    /// Create an unlimited config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max pages
    #[must_use]
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set max items
    #[must_use]
    pub fn with_max_items(mut self, items: usize) -> Self {
        self.max_items = items;
        self
    }

    /// Whether either limit has been hit
    pub fn limit_reached(&self, pages: u32, items: usize) -> bool {
        (self.max_pages > 0 && pages >= self.max_pages)
            || (self.max_items > 0 && items >= self.max_items)
    }
}

/// Statistics for a paging session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PagerStats {
    /// Pages fetched successfully
    pub pages_fetched: u32,
    /// Items received across all batches
    pub items_fetched: u64,
    /// Failed fetch or merge attempts
    pub errors: u32,
}

impl PagerStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Record received items
    pub fn add_items(&mut self, count: usize) {
        self.items_fetched += count as u64;
    }

    /// Record a failure
    pub fn add_error(&mut self) {
        self.errors += 1;
    }
}
