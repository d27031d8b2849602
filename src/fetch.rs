//! Fetch collaborator interface
//!
//! The merger never talks to a network itself. It hands derived
//! [`FetchParameters`] to a [`Fetcher`] and receives one batch back.
//! Retries, timeouts and transport errors are the fetcher's business.

use crate::error::Result;
use crate::pagination::FetchParameters;
use crate::types::PagedResult;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Performs one round trip for the given parameters
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    /// Fetch a single batch
    async fn fetch(&self, params: &FetchParameters) -> Result<PagedResult<T>>;
}

#[async_trait]
impl<T, F> Fetcher<T> for Arc<F>
where
    T: Send + 'static,
    F: Fetcher<T> + ?Sized,
{
    async fn fetch(&self, params: &FetchParameters) -> Result<PagedResult<T>> {
        (**self).fetch(params).await
    }
}

/// Adapts an async closure into a [`Fetcher`]
///
/// ```rust,ignore
/// let fetcher = FnFetcher::new(|params: FetchParameters| async move {
///     Ok(PagedResult::new(vec![params.limit()]))
/// });
/// ```
pub struct FnFetcher<T, F> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FnFetcher<T, F> {
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F, Fut> Fetcher<T> for FnFetcher<T, F>
where
    T: Send + 'static,
    F: Fn(FetchParameters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PagedResult<T>>> + Send,
{
    async fn fetch(&self, params: &FetchParameters) -> Result<PagedResult<T>> {
        (self.f)(params.clone()).await
    }
}

impl<T, F> std::fmt::Debug for FnFetcher<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}
