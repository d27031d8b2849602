//! Incremental fetch-and-merge
//!
//! One call derives parameters from the current result, fetches one batch
//! through the collaborator, and merges it with the supplied rule. The
//! current result is only ever borrowed.
//!
//! Whatever the fetcher returns as an error is reported as a fetch error
//! (see [`Error::into_fetch_error`]); only the merge step produces
//! [`Error::Merge`].

use super::rules::MergeRule;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::pagination::{DeriveParameters, FetchParameters};
use crate::types::PagedResult;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// A fetched batch together with the combined result it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBatch<T> {
    /// Parameters the batch was requested with
    pub params: FetchParameters,
    /// The batch as returned by the fetcher
    pub batch: PagedResult<T>,
    /// Result of merging the batch into the previous result
    pub combined: PagedResult<T>,
}

/// Fetches the next batch and merges it into an existing result
#[derive(Debug, Clone)]
pub struct IncrementalMerger<F> {
    fetcher: F,
}

impl<F> IncrementalMerger<F> {
    /// Create a merger around a fetch collaborator
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Get the fetch collaborator
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Perform the first fetch, creating a result
    pub async fn fetch_initial<T>(&self, params: &FetchParameters) -> Result<PagedResult<T>>
    where
        F: Fetcher<T>,
    {
        debug!("Fetching initial batch with {:?}", params);
        self.fetcher
            .fetch(params)
            .await
            .map_err(Error::into_fetch_error)
    }

    /// Fetch the batch after `current` and return the combined result
    pub async fn fetch_next_batch<T, D, M>(
        &self,
        current: &PagedResult<T>,
        derive: &D,
        rule: &M,
    ) -> Result<PagedResult<T>>
    where
        F: Fetcher<T>,
        D: DeriveParameters<T> + ?Sized,
        M: MergeRule<T> + ?Sized,
    {
        self.fetch_and_merge(current, derive, rule)
            .await
            .map(|merged| merged.combined)
    }

    /// Like [`fetch_next_batch`](Self::fetch_next_batch), but also returns
    /// the raw batch and the parameters used
    pub async fn fetch_and_merge<T, D, M>(
        &self,
        current: &PagedResult<T>,
        derive: &D,
        rule: &M,
    ) -> Result<MergedBatch<T>>
    where
        F: Fetcher<T>,
        D: DeriveParameters<T> + ?Sized,
        M: MergeRule<T> + ?Sized,
    {
        merge_step(&self.fetcher, current, derive, rule).await
    }
}

/// Fetch the batch after `current` through `fetcher` and merge it
///
/// Free-function form of [`IncrementalMerger::fetch_next_batch`].
pub async fn fetch_next_batch<T, F, D, M>(
    fetcher: &F,
    current: &PagedResult<T>,
    derive: &D,
    rule: &M,
) -> Result<PagedResult<T>>
where
    F: Fetcher<T> + ?Sized,
    D: DeriveParameters<T> + ?Sized,
    M: MergeRule<T> + ?Sized,
{
    merge_step(fetcher, current, derive, rule)
        .await
        .map(|merged| merged.combined)
}

async fn merge_step<T, F, D, M>(
    fetcher: &F,
    current: &PagedResult<T>,
    derive: &D,
    rule: &M,
) -> Result<MergedBatch<T>>
where
    F: Fetcher<T> + ?Sized,
    D: DeriveParameters<T> + ?Sized,
    M: MergeRule<T> + ?Sized,
{
    let params = derive.derive(current);
    debug!(
        "Derived {:?} from result with {} items",
        params,
        current.len()
    );

    let batch = fetcher
        .fetch(&params)
        .await
        .map_err(Error::into_fetch_error)?;

    let combined = apply_merge(rule, current, &batch)?;
    debug!(
        "Merged {} fetched items into {} -> {}",
        batch.len(),
        current.len(),
        combined.len()
    );

    Ok(MergedBatch {
        params,
        batch,
        combined,
    })
}

/// Run a merge rule, turning failures and panics into [`Error::Merge`]
///
/// Nothing is applied unless the rule completes.
pub fn apply_merge<T, M>(
    rule: &M,
    previous: &PagedResult<T>,
    incoming: &PagedResult<T>,
) -> Result<PagedResult<T>>
where
    M: MergeRule<T> + ?Sized,
{
    match catch_unwind(AssertUnwindSafe(|| rule.merge(previous, incoming))) {
        Ok(Ok(combined)) => Ok(combined),
        Ok(Err(err)) if err.is_merge_error() => Err(err),
        Ok(Err(err)) => Err(Error::merge(err.to_string())),
        Err(payload) => Err(Error::merge(format!(
            "merge rule panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
