//! Pager module
//!
//! Owns the paging state for one list: the current result, the strategy
//! that derives the next parameters, and the merge rule.
//!
//! # Overview
//!
//! - `Pager` - explicit state holder; `load_more` takes `&mut self`, so two
//!   "load more" calls can never race on the same cursor or offset
//! - `SharedPager` - the same behind an async mutex for use from several tasks
//! - `PagerConfig` / `PagerStats` - limits and counters
//!
//! Each pager carries its own state, so any number of independent lists can
//! page at once.

mod types;

pub use types::{PagerConfig, PagerStats};

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::merge::{apply_merge, IncrementalMerger, MergeRule, MergeStrategy};
use crate::pagination::{DeriveParameters, PaginationStrategy, Paginator};
use crate::types::PagedResult;
use futures::stream::{self, Stream};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Caller-owned paging state for one list
pub struct Pager<T, F, P = PaginationStrategy, M = MergeStrategy> {
    merger: IncrementalMerger<F>,
    paginator: P,
    rule: M,
    config: PagerConfig,
    current: Option<PagedResult<T>>,
    exhausted: bool,
    stats: PagerStats,
}

impl<T, F, P, M> Pager<T, F, P, M>
where
    F: Fetcher<T>,
    P: Paginator<T>,
    M: MergeRule<T>,
{
    /// Create a new pager with nothing loaded
    ///
    /// See [`try_new`](Self::try_new) for the combinations `load_more`
    /// refuses.
    pub fn new(fetcher: F, paginator: P, rule: M) -> Self {
        Self {
            merger: IncrementalMerger::new(fetcher),
            paginator,
            rule,
            config: PagerConfig::default(),
            current: None,
            exhausted: false,
            stats: PagerStats::default(),
        }
    }

    /// Create a pager, rejecting a paginator and rule that cannot advance
    ///
    /// An offset paginator positions each request by the number of items
    /// held, so a rule that drops the previous items (`Replace`) would
    /// request the same page forever.
    pub fn try_new(fetcher: F, paginator: P, rule: M) -> Result<Self> {
        let pager = Self::new(fetcher, paginator, rule);
        pager.check_compatible()?;
        Ok(pager)
    }

    /// Set pager configuration
    #[must_use]
    pub fn with_config(mut self, config: PagerConfig) -> Self {
        if let Some(current) = &self.current {
            self.exhausted |= config.limit_reached(self.stats.pages_fetched, current.len());
        }
        self.config = config;
        self
    }

    /// Start from an already fetched result instead of calling `load_first`
    ///
    /// The seeded result is checked for exhaustion like a fetched first
    /// page, but is not counted in the statistics.
    #[must_use]
    pub fn with_initial(mut self, initial: PagedResult<T>) -> Self {
        self.exhausted = self.paginator.is_exhausted(&initial, &initial)
            || self
                .config
                .limit_reached(self.stats.pages_fetched, initial.len());
        self.current = Some(initial);
        self
    }

    /// The most recent combined result
    pub fn current(&self) -> Option<&PagedResult<T>> {
        self.current.as_ref()
    }

    /// Consume the pager, returning the most recent combined result
    pub fn into_current(self) -> Option<PagedResult<T>> {
        self.current
    }

    /// Whether the last batch indicated the end, or a limit was hit
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Get statistics
    pub fn stats(&self) -> &PagerStats {
        &self.stats
    }

    /// Get the pagination strategy
    pub fn paginator(&self) -> &P {
        &self.paginator
    }

    /// Get the fetch collaborator
    pub fn fetcher(&self) -> &F {
        self.merger.fetcher()
    }

    /// Drop the loaded result and counters
    pub fn reset(&mut self) {
        self.current = None;
        self.exhausted = false;
        self.stats = PagerStats::default();
    }

    /// Fetch the first page, replacing anything loaded before
    pub async fn load_first(&mut self) -> Result<&PagedResult<T>> {
        let params = self.paginator.initial_params();
        let batch = match self.merger.fetch_initial(&params).await {
            Ok(batch) => batch,
            Err(e) => {
                self.stats.add_error();
                warn!("Initial fetch failed: {e}");
                return Err(e);
            }
        };

        // Failed attempts stay counted
        self.stats = PagerStats {
            errors: self.stats.errors,
            ..PagerStats::default()
        };
        self.stats.add_page();
        self.stats.add_items(batch.len());
        self.exhausted = self.paginator.is_exhausted(&batch, &batch)
            || self.config.limit_reached(self.stats.pages_fetched, batch.len());

        debug!(
            "Loaded first page: {} items, exhausted={}",
            batch.len(),
            self.exhausted
        );
        Ok(&*self.current.insert(batch))
    }

    /// Fetch the next page and merge it into the current result
    ///
    /// On failure the current result is kept exactly as it was.
    pub async fn load_more(&mut self) -> Result<&PagedResult<T>> {
        self.check_compatible()?;
        let current = self.current.as_ref().ok_or(Error::NotLoaded)?;
        if self.exhausted {
            return Err(Error::Exhausted {
                pages: self.stats.pages_fetched,
            });
        }

        let merged = match self
            .merger
            .fetch_and_merge(current, &self.paginator, &self.rule)
            .await
        {
            Ok(merged) => merged,
            Err(e) => {
                self.stats.add_error();
                warn!("Load more failed after {} pages: {e}", self.stats.pages_fetched);
                return Err(e);
            }
        };

        // The next request would repeat this one
        let stalled = self.paginator.derive(&merged.combined) == merged.params;
        if stalled {
            warn!("Paging stalled at {:?}, stopping", merged.params);
        }

        self.stats.add_page();
        self.stats.add_items(merged.batch.len());
        self.exhausted = stalled
            || self.paginator.is_exhausted(&merged.batch, &merged.combined)
            || self
                .config
                .limit_reached(self.stats.pages_fetched, merged.combined.len());

        debug!(
            "Page {}: {} new items, {} total, exhausted={}",
            self.stats.pages_fetched,
            merged.batch.len(),
            merged.combined.len(),
            self.exhausted
        );
        Ok(&*self.current.insert(merged.combined))
    }

    /// Keep loading until the source is exhausted or a limit is hit
    pub async fn load_all(&mut self) -> Result<&PagedResult<T>> {
        if self.current.is_none() {
            self.load_first().await?;
        }

        while !self.exhausted {
            self.load_more().await?;
        }

        let current = self.current.as_ref().ok_or(Error::NotLoaded)?;
        info!(
            "Loaded {} items in {} pages",
            current.len(),
            self.stats.pages_fetched
        );
        Ok(current)
    }

    /// Merge an externally obtained batch with the pager's rule
    ///
    /// Useful when a batch arrives by push (subscription, cache) rather
    /// than through the fetcher. The batch counts as a page toward the
    /// statistics and limits, and exhaustion is re-evaluated against it.
    pub fn merge_batch(&mut self, batch: PagedResult<T>) -> Result<&PagedResult<T>> {
        let merged = match &self.current {
            Some(current) => match apply_merge(&self.rule, current, &batch) {
                Ok(combined) => Some(combined),
                Err(e) => {
                    self.stats.add_error();
                    warn!("Merging pushed batch failed: {e}");
                    return Err(e);
                }
            },
            None => None,
        };

        self.stats.add_page();
        self.stats.add_items(batch.len());
        let combined = merged.as_ref().unwrap_or(&batch);
        self.exhausted = self.paginator.is_exhausted(&batch, combined)
            || self
                .config
                .limit_reached(self.stats.pages_fetched, combined.len());

        debug!(
            "Merged pushed batch of {} items, {} total, exhausted={}",
            batch.len(),
            combined.len(),
            self.exhausted
        );
        Ok(&*self.current.insert(merged.unwrap_or(batch)))
    }

    fn check_compatible(&self) -> Result<()> {
        if self.paginator.counts_held_items() && !self.rule.keeps_previous() {
            return Err(Error::config(
                "offset pagination needs a merge rule that keeps previous items",
            ));
        }
        Ok(())
    }
}

impl<T, F, P, M> Pager<T, F, P, M>
where
    T: Clone,
    F: Fetcher<T>,
    P: Paginator<T>,
    M: MergeRule<T>,
{
    /// Turn the pager into a stream of successive combined results
    ///
    /// The stream ends after the last page, or after yielding the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<PagedResult<T>>> {
        stream::unfold(Some(self), |state| async move {
            let Some(mut pager) = state else {
                return None;
            };

            let step = if pager.current.is_none() {
                pager.load_first().await.cloned()
            } else if pager.exhausted {
                return None;
            } else {
                pager.load_more().await.cloned()
            };

            match step {
                Ok(result) => Some((Ok(result), Some(pager))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

impl<T, F, P, M> std::fmt::Debug for Pager<T, F, P, M>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("paginator", &self.paginator)
            .field("config", &self.config)
            .field("loaded", &self.current.as_ref().map(PagedResult::len))
            .field("exhausted", &self.exhausted)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Shared Pager
// ============================================================================

/// A pager shared between tasks
///
/// Every operation takes the lock for its whole duration, so concurrent
/// "load more" requests run one after another and each derives its
/// parameters from the result the previous one produced.
pub struct SharedPager<T, F, P = PaginationStrategy, M = MergeStrategy> {
    inner: Arc<Mutex<Pager<T, F, P, M>>>,
}

impl<T, F, P, M> Clone for SharedPager<T, F, P, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, F, P, M> SharedPager<T, F, P, M>
where
    T: Clone,
    F: Fetcher<T>,
    P: Paginator<T>,
    M: MergeRule<T>,
{
    /// Wrap a pager
    pub fn new(pager: Pager<T, F, P, M>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pager)),
        }
    }

    /// Fetch the first page
    pub async fn load_first(&self) -> Result<PagedResult<T>> {
        self.inner.lock().await.load_first().await.cloned()
    }

    /// Fetch and merge the next page
    pub async fn load_more(&self) -> Result<PagedResult<T>> {
        self.inner.lock().await.load_more().await.cloned()
    }

    /// Load every remaining page
    pub async fn load_all(&self) -> Result<PagedResult<T>> {
        self.inner.lock().await.load_all().await.cloned()
    }

    /// Copy of the current combined result
    pub async fn snapshot(&self) -> Option<PagedResult<T>> {
        self.inner.lock().await.current().cloned()
    }

    /// Copy of the statistics
    pub async fn stats(&self) -> PagerStats {
        *self.inner.lock().await.stats()
    }

    /// Whether paging is finished
    pub async fn is_exhausted(&self) -> bool {
        self.inner.lock().await.is_exhausted()
    }
}
