//! Tests for pagination module

use super::*;
use crate::types::PagedResult;
use serde_json::json;
use test_case::test_case;

fn items(range: std::ops::RangeInclusive<u32>) -> PagedResult<u32> {
    PagedResult::new(range.collect())
}

// ============================================================================
// FetchParameters Tests
// ============================================================================

#[test]
fn test_fetch_parameters_accessors() {
    let params = FetchParameters::offset(20, 10);
    assert!(params.is_offset());
    assert!(!params.is_cursor());
    assert_eq!(params.limit(), 10);

    let params = FetchParameters::cursor(Some("c0".to_string()), 25);
    assert!(params.is_cursor());
    assert_eq!(params.limit(), 25);
}

#[test]
fn test_offset_parameters_to_variables() {
    let vars = FetchParameters::offset(40, 20).to_variables(&VariableNames::default());
    assert_eq!(json!(vars), json!({"offset": 40, "limit": 20}));
}

#[test]
fn test_cursor_parameters_to_variables() {
    let names = VariableNames::relay();

    let vars = FetchParameters::cursor(Some("abc".to_string()), 5).to_variables(&names);
    assert_eq!(json!(vars), json!({"first": 5, "after": "abc"}));

    // First page carries no cursor at all
    let vars = FetchParameters::cursor(None, 5).to_variables(&names);
    assert_eq!(json!(vars), json!({"first": 5}));
}

#[test]
fn test_parameters_to_query_params() {
    let params = FetchParameters::cursor(Some("tok_1".to_string()), 50)
        .to_query_params(&VariableNames::default());
    assert_eq!(params.get("cursor"), Some(&"tok_1".to_string()));
    assert_eq!(params.get("limit"), Some(&"50".to_string()));
}

#[test]
fn test_variable_names_deserialize_defaults() {
    let names: VariableNames = serde_json::from_value(json!({"limit": "take"})).unwrap();
    assert_eq!(names.limit, "take");
    assert_eq!(names.offset, "offset");
    assert_eq!(names.cursor, "cursor");
}

// ============================================================================
// StopCondition Tests
// ============================================================================

#[test_case(StopCondition::Never, 0, None, None => StopResult::Continue ; "never")]
#[test_case(StopCondition::EmptyPage, 0, None, None => StopResult::Stop ; "empty page stops")]
#[test_case(StopCondition::EmptyPage, 3, None, None => StopResult::Continue ; "non-empty page continues")]
#[test_case(StopCondition::TotalCount, 3, Some(3), None => StopResult::Stop ; "total reached")]
#[test_case(StopCondition::TotalCount, 3, Some(9), None => StopResult::Continue ; "total not reached")]
#[test_case(StopCondition::HasMoreFlag, 3, None, Some(true) => StopResult::Continue ; "has more")]
#[test_case(StopCondition::HasMoreFlag, 3, None, None => StopResult::Stop ; "missing flag stops")]
fn test_check_stop_condition(
    condition: StopCondition,
    len: u32,
    total: Option<u64>,
    has_more: Option<bool>,
) -> StopResult {
    let mut batch = PagedResult::new((0..len).collect::<Vec<_>>());
    batch.total_count = total;
    batch.has_more = has_more;
    check_stop_condition(condition, &batch, &batch)
}

#[test]
fn test_stop_result_helpers() {
    assert!(StopResult::Stop.should_stop());
    assert!(!StopResult::Stop.should_continue());
    assert!(StopResult::Continue.should_continue());
}

// ============================================================================
// Offset Strategy Tests
// ============================================================================

#[test]
fn test_offset_strategy_initial_params() {
    let strategy = OffsetStrategy::new(10);
    let params = Paginator::<u32>::initial_params(&strategy);
    assert_eq!(params, FetchParameters::offset(0, 10));
}

#[test]
fn test_offset_strategy_derives_from_item_count() {
    let strategy = OffsetStrategy::new(10);
    let current = items(1..=10);

    assert_eq!(strategy.derive(&current), FetchParameters::offset(10, 10));
}

#[test]
fn test_offset_strategy_derive_is_idempotent() {
    let strategy = OffsetStrategy::new(10);
    let current = items(1..=30);

    let first = strategy.derive(&current);
    let second = strategy.derive(&current);
    assert_eq!(first, second);
    assert_eq!(current, items(1..=30));
}

#[test]
fn test_offset_strategy_exhaustion() {
    let strategy = OffsetStrategy::new(10);

    // Full page continues
    assert!(!strategy.is_exhausted(&items(11..=20), &items(1..=20)));

    // Short page stops
    assert!(strategy.is_exhausted(&items(21..=25), &items(1..=25)));

    // Explicit end flag stops even on a full page
    let batch = items(11..=20).with_has_more(false);
    assert!(strategy.is_exhausted(&batch, &items(1..=20)));

    // Reported total reached
    let combined = items(1..=20).with_total_count(20);
    assert!(strategy.is_exhausted(&items(11..=20), &combined));
}

#[test]
fn test_offset_strategy_custom_stop_condition() {
    let strategy = OffsetStrategy::new(2).with_stop_condition(StopCondition::HasMoreFlag);
    let batch = items(1..=2);
    assert!(strategy.is_exhausted(&batch, &batch));

    let batch = items(1..=2).with_has_more(true);
    assert!(!strategy.is_exhausted(&batch, &batch));
}

// ============================================================================
// Cursor Strategy Tests
// ============================================================================

#[test]
fn test_cursor_strategy_initial_params() {
    let strategy = CursorStrategy::new(2);
    let params = Paginator::<u32>::initial_params(&strategy);
    assert_eq!(params, FetchParameters::cursor(None, 2));
}

#[test]
fn test_cursor_strategy_reads_stored_cursor() {
    let strategy = CursorStrategy::new(2);
    let current = items(1..=7).with_cursor("c0");

    // The token is used as-is, not recomputed from the item count
    assert_eq!(
        strategy.derive(&current),
        FetchParameters::cursor(Some("c0".to_string()), 2)
    );
    assert_eq!(strategy.derive(&current), strategy.derive(&current));
}

#[test]
fn test_cursor_strategy_exhaustion() {
    let strategy = CursorStrategy::new(2);

    let batch = items(1..=2).with_cursor("c1");
    assert!(!strategy.is_exhausted(&batch, &batch));

    // Missing or empty cursor stops
    let batch = items(1..=2);
    assert!(strategy.is_exhausted(&batch, &batch));
    let batch = items(1..=2).with_cursor("");
    assert!(strategy.is_exhausted(&batch, &batch));

    // Empty page stops via the default stop condition
    let batch = PagedResult::<u32>::empty().with_cursor("c2");
    assert!(strategy.is_exhausted(&batch, &batch));
}

// ============================================================================
// PaginationStrategy Tests
// ============================================================================

#[test]
fn test_pagination_strategy_dispatch() {
    let offset: PaginationStrategy = OffsetStrategy::new(5).into();
    let cursor: PaginationStrategy = CursorStrategy::new(5).into();
    let current = items(1..=5).with_cursor("next");

    assert_eq!(offset.derive(&current), FetchParameters::offset(5, 5));
    assert_eq!(
        cursor.derive(&current),
        FetchParameters::cursor(Some("next".to_string()), 5)
    );
    assert_eq!(
        Paginator::<u32>::initial_params(&cursor),
        FetchParameters::cursor(None, 5)
    );
    assert!(Paginator::<u32>::counts_held_items(&offset));
    assert!(!Paginator::<u32>::counts_held_items(&cursor));
}

#[test]
fn test_closure_derivation() {
    let derive = |current: &PagedResult<u32>| FetchParameters::offset(current.len() as u64 * 2, 1);
    assert_eq!(derive.derive(&items(1..=3)), FetchParameters::offset(6, 1));
}
