//! Behavior of offset and cursor paging while the remote collection changes
//!
//! Offset paging derives the next offset from the number of items held, so
//! insertions ahead of the window repeat items and removals skip them. These
//! tests pin that down as the expected behavior of offset pagination. Cursor
//! paging keys on the last item seen and is unaffected.

use fetch_more::{
    fetch_next_batch, CursorStrategy, DeriveParameters, Error, FetchParameters, Fetcher,
    FnFetcher, MergeStrategy, OffsetStrategy, PagedResult, Pager, Paginator, Result,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::future::{ready, Ready};
use std::sync::{Arc, Mutex};

type Collection = Arc<Mutex<Vec<u32>>>;

/// Offset source over a shared collection
///
/// `after_fetch` runs once each request has been answered, standing in for
/// a writer that touches the collection between two requests.
fn offset_source(
    collection: Collection,
    after_fetch: impl Fn(&mut Vec<u32>) + Send + Sync,
) -> FnFetcher<u32, impl Fn(FetchParameters) -> Ready<Result<PagedResult<u32>>>> {
    FnFetcher::new(move |params: FetchParameters| {
        let FetchParameters::Offset { offset, limit } = params else {
            return ready(Err(Error::fetch("offset parameters expected")));
        };
        let mut items = collection.lock().unwrap();
        let page: Vec<u32> = items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .copied()
            .collect();
        after_fetch(&mut items);
        ready(Ok(PagedResult::new(page)))
    })
}

/// Newest-first feed where cursor `n` means "ids below n"
fn cursor_source(
    collection: Collection,
    after_fetch: impl Fn(&mut Vec<u32>) + Send + Sync,
) -> FnFetcher<u32, impl Fn(FetchParameters) -> Ready<Result<PagedResult<u32>>>> {
    FnFetcher::new(move |params: FetchParameters| {
        let FetchParameters::Cursor { cursor, limit } = params else {
            return ready(Err(Error::fetch("cursor parameters expected")));
        };
        let below = cursor.and_then(|c| c.parse::<u32>().ok()).unwrap_or(u32::MAX);
        let mut items = collection.lock().unwrap();
        let page: Vec<u32> = items
            .iter()
            .copied()
            .filter(|id| *id < below)
            .take(limit as usize)
            .collect();
        after_fetch(&mut items);

        let mut result = PagedResult::new(page.clone());
        if let Some(last) = page.last() {
            result = result.with_cursor(last.to_string());
        }
        ready(Ok(result))
    })
}

/// Newest-first collection `top, top-1, ..., 1`
fn newest_first(top: u32) -> Collection {
    Arc::new(Mutex::new((1..=top).rev().collect()))
}

/// Insert a new item at the head, one above the current newest
fn insert_at_head(items: &mut Vec<u32>) {
    let next = items.first().map_or(1, |newest| newest + 1);
    items.insert(0, next);
}

fn duplicates(items: &[u32]) -> Vec<u32> {
    let mut seen = HashSet::new();
    items.iter().copied().filter(|id| !seen.insert(*id)).collect()
}

// ============================================================================
// Offset Anomalies
// ============================================================================

#[tokio::test]
async fn test_offset_head_insertion_duplicates_items() {
    let collection = newest_first(10);
    let fetcher = offset_source(Arc::clone(&collection), insert_at_head);
    let strategy = OffsetStrategy::new(3);

    let mut pager = Pager::new(fetcher, strategy, MergeStrategy::Append);
    pager.load_first().await.unwrap();
    let combined = pager.load_more().await.unwrap();

    // 11 was inserted after the first page, pushing 8 into the next window
    assert_eq!(combined.items, vec![10, 9, 8, 8, 7, 6]);
    assert_eq!(duplicates(&combined.items), vec![8]);
}

#[tokio::test]
async fn test_offset_fetches_derived_from_same_result_concurrently() {
    let collection = newest_first(10);
    let fetcher = offset_source(Arc::clone(&collection), insert_at_head);
    let strategy = OffsetStrategy::new(3);

    let first = fetcher
        .fetch(&Paginator::<u32>::initial_params(&strategy))
        .await
        .unwrap();
    assert_eq!(first.items, vec![10, 9, 8]);

    // Both derive offset 3 from the same result; the collection grows under them
    let (a, b) = tokio::join!(
        fetch_next_batch(&fetcher, &first, &strategy, &MergeStrategy::Append),
        fetch_next_batch(&fetcher, &first, &strategy, &MergeStrategy::Append),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.len(), 6);
    assert_eq!(b.len(), 6);
    assert!(!duplicates(&a.items).is_empty());
    assert!(!duplicates(&b.items).is_empty());
    assert_ne!(a.items, b.items);

    // The result both were derived from is untouched
    assert_eq!(first.items, vec![10, 9, 8]);
    assert_eq!(collection.lock().unwrap().len(), 13);
}

#[tokio::test]
async fn test_offset_head_removal_skips_items() {
    let collection: Collection = Arc::new(Mutex::new((1..=10).collect()));
    let fetcher = offset_source(Arc::clone(&collection), |items| {
        items.remove(0);
    });

    let mut pager = Pager::new(fetcher, OffsetStrategy::new(3), MergeStrategy::Append);
    pager.load_first().await.unwrap();
    let combined = pager.load_more().await.unwrap();

    // 1 was removed after the first page, so 4 slid into position 2 and was never served
    assert_eq!(combined.items, vec![1, 2, 3, 5, 6, 7]);
    assert!(!combined.items.contains(&4));
}

#[tokio::test]
async fn test_offset_stable_collection_has_no_anomaly() {
    let collection = newest_first(7);
    let fetcher = offset_source(collection, |_| {});

    let mut pager = Pager::new(fetcher, OffsetStrategy::new(3), MergeStrategy::Append);
    let all = pager.load_all().await.unwrap();

    assert_eq!(all.items, vec![7, 6, 5, 4, 3, 2, 1]);
    assert!(duplicates(&all.items).is_empty());
}

// ============================================================================
// Cursor Robustness
// ============================================================================

#[tokio::test]
async fn test_cursor_unaffected_by_head_insertion() {
    let collection = newest_first(10);
    let fetcher = cursor_source(Arc::clone(&collection), insert_at_head);

    let mut pager = Pager::new(fetcher, CursorStrategy::new(3), MergeStrategy::Append);
    pager.load_first().await.unwrap();
    pager.load_more().await.unwrap();
    let combined = pager.load_more().await.unwrap();

    assert_eq!(combined.items, vec![10, 9, 8, 7, 6, 5, 4, 3, 2]);
    assert!(duplicates(&combined.items).is_empty());
    assert_eq!(combined.cursor.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_cursor_unaffected_by_removal_elsewhere() {
    let collection = newest_first(10);
    let fetcher = cursor_source(Arc::clone(&collection), |items| {
        items.remove(0);
    });

    let mut pager = Pager::new(fetcher, CursorStrategy::new(3), MergeStrategy::Append);
    pager.load_first().await.unwrap();
    let combined = pager.load_more().await.unwrap();

    assert_eq!(combined.items, vec![10, 9, 8, 7, 6, 5]);
}

// ============================================================================
// Derivation
// ============================================================================

#[test]
fn test_derivation_depends_only_on_result() {
    let result = PagedResult::new(vec![1, 2, 3, 4]).with_cursor("4");

    let offset = OffsetStrategy::new(2);
    assert_eq!(offset.derive(&result), offset.derive(&result));
    assert_eq!(offset.derive(&result), FetchParameters::offset(4, 2));

    let cursor = CursorStrategy::new(2);
    assert_eq!(
        cursor.derive(&result),
        FetchParameters::cursor(Some("4".to_string()), 2)
    );

    // Two results in flight at once derive independently
    let other = PagedResult::new(vec![1]);
    assert_eq!(offset.derive(&other), FetchParameters::offset(1, 2));
    assert_eq!(offset.derive(&result), FetchParameters::offset(4, 2));
}
