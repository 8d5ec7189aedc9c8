// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::FreshetError;
use freshet_materialize::{
    drop_while, DeferredListMaterializer, FailedMaterializer, ListMaterializer,
    ListMaterializerExt, MaterializedList, ResolveCtx,
};
use freshet_test_utils::{ConsumerLog, CountingSource, ResultLatch};
use std::sync::Arc;

#[test]
fn drops_the_matching_prefix_only() {
    let counting = CountingSource::over_list(vec![1, 2, 3, 4, 1]);
    let source: Arc<dyn ListMaterializer<i32>> = counting;
    let dropped = drop_while(source, |v| *v < 3);

    let log = ConsumerLog::new();
    dropped.materialize_elements(log.consumer());

    // The trailing 1 survives: only the prefix is subject to the predicate
    assert_eq!(log.values(), vec![3, 4, 1]);
    assert_eq!(log.completed(), Some(3));
    assert!(dropped.is_done());
    assert_eq!(dropped.known_size(), 3);
}

#[test]
fn dropping_everything_yields_the_empty_list() {
    let source: Arc<dyn ListMaterializer<i32>> = Arc::new(MaterializedList::new(vec![1, 2]));
    let dropped = drop_while(source, |v| *v < 3);

    let empty = ResultLatch::new();
    dropped.materialize_empty(empty.consumer());
    assert!(matches!(empty.peek(), Some(Ok(true))));

    let log = ConsumerLog::new();
    dropped.materialize_elements(log.consumer());
    assert!(log.values().is_empty());
    assert_eq!(log.completed(), Some(0));
}

#[test]
fn nothing_is_pulled_before_the_first_caller() {
    let counting = CountingSource::over_list(vec![1, 2, 3]);
    let source: Arc<dyn ListMaterializer<i32>> = counting.clone();
    let dropped = drop_while(source, |v| *v < 2);

    assert_eq!(counting.element_pulls(), 0);
    assert_eq!(counting.walks(), 0);

    let log = ConsumerLog::new();
    dropped.materialize_elements(log.consumer());
    assert!(counting.element_pulls() > 0);
    assert_eq!(log.values(), vec![2, 3]);
}

#[test]
fn the_source_is_resolved_exactly_once() {
    let counting = CountingSource::over_list(vec![1, 2, 3, 4]);
    let source: Arc<dyn ListMaterializer<i32>> = counting.clone();
    let dropped = drop_while(source, |v| *v < 3);

    let size = ResultLatch::new();
    dropped.materialize_size(size.consumer());
    assert!(matches!(size.peek(), Some(Ok(2))));

    // Boundary sits at index 2: probes for 0, 1 and 2, then one suffix walk
    assert_eq!(counting.element_pulls(), 3);
    assert_eq!(counting.walks(), 1);

    let again = ResultLatch::new();
    dropped.materialize_size(again.consumer());
    assert!(matches!(again.peek(), Some(Ok(2))));
    assert_eq!(counting.element_pulls(), 3);
    assert_eq!(counting.walks(), 1);
}

#[test]
fn source_failure_propagates() {
    let source: Arc<dyn ListMaterializer<i32>> =
        Arc::new(FailedMaterializer::new(FreshetError::upstream("boom")));
    let dropped = drop_while(source, |_| true);

    let log = ConsumerLog::new();
    dropped.materialize_elements(log.consumer());
    assert!(matches!(log.error(), Some(FreshetError::Upstream { .. })));
    assert!(dropped.is_failed());
}

#[test]
fn cancellation_reaches_the_wrapped_source() {
    // A source that never resolves on its own
    let source: Arc<dyn ListMaterializer<i32>> = Arc::new(DeferredListMaterializer::new(
        |_ctx: ResolveCtx<i32>| {},
        |_| {},
    ));
    let dropped = drop_while(Arc::clone(&source), |_| true);

    dropped.materialize_cancel(FreshetError::Cancelled);

    assert!(dropped.is_cancelled());
    assert!(source.is_cancelled());
}

#[test]
fn operators_chain_through_the_extension_trait() {
    let source: Arc<dyn ListMaterializer<i32>> =
        Arc::new(MaterializedList::new(vec![1, 1, 2, 3, 1]));
    let result = source.drop_while(|v| *v == 1).drop_while(|v| *v == 2);

    let log = ConsumerLog::new();
    result.materialize_elements(log.consumer());
    assert_eq!(log.values(), vec![3, 1]);
}
