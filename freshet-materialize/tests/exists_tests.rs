// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::FreshetError;
use freshet_materialize::{
    exists, FailedMaterializer, ListMaterializer, ListMaterializerExt, MaterializedList,
};
use freshet_test_utils::{ConsumerLog, CountingSource, ResultLatch};
use std::sync::Arc;

/// The single boolean answer an `exists` materializer resolves to.
fn answer_of(materializer: &Arc<dyn ListMaterializer<bool>>) -> bool {
    let log = ConsumerLog::new();
    materializer.materialize_element(0, log.consumer());
    let accepted = log.accepted();
    assert_eq!(accepted.len(), 1, "exists resolves to exactly one element");
    accepted[0].1
}

#[test]
fn empty_source_is_false_without_pulling_elements() {
    let counting = CountingSource::over_list(Vec::<i32>::new());
    let source: Arc<dyn ListMaterializer<i32>> = counting.clone();
    let found = exists(source, |_| true);

    assert!(!answer_of(&found));
    assert_eq!(counting.empty_probes(), 1);
    assert_eq!(counting.element_pulls(), 0);
}

#[test]
fn stops_probing_at_the_first_match() {
    let counting = CountingSource::over_list(vec![1, 2, 3, 4, 5]);
    let source: Arc<dyn ListMaterializer<i32>> = counting.clone();
    let found = exists(source, |v| *v == 3);

    assert!(answer_of(&found));
    // Probes 0, 1 and 2; elements past the match are never pulled
    assert_eq!(counting.element_pulls(), 3);
}

#[test]
fn no_match_resolves_to_false_after_a_full_walk() {
    let counting = CountingSource::over_list(vec![1, 2]);
    let source: Arc<dyn ListMaterializer<i32>> = counting.clone();
    let found = exists(source, |v| *v > 5);

    assert!(!answer_of(&found));
    // Probes 0, 1, then the past-the-end probe that completes
    assert_eq!(counting.element_pulls(), 3);
}

#[test]
fn the_answer_is_a_single_element_list() {
    let source: Arc<dyn ListMaterializer<i32>> = Arc::new(MaterializedList::new(vec![7]));
    let found = exists(source, |v| *v == 7);

    let size = ResultLatch::new();
    found.materialize_size(size.consumer());
    assert!(matches!(size.peek(), Some(Ok(1))));
    assert_eq!(found.known_size(), 1);

    let contains = ResultLatch::new();
    found.materialize_contains(true, contains.consumer());
    assert!(matches!(contains.peek(), Some(Ok(true))));
}

#[test]
fn source_failure_propagates() {
    let source: Arc<dyn ListMaterializer<i32>> =
        Arc::new(FailedMaterializer::new(FreshetError::upstream("boom")));
    let found = exists(source, |_| true);

    let latch = ResultLatch::<bool>::new();
    found.materialize_empty(latch.consumer());
    assert!(matches!(latch.peek(), Some(Err(FreshetError::Upstream { .. }))));
    assert!(found.is_failed());
}

#[test]
fn exists_composes_with_drop_while() {
    let source: Arc<dyn ListMaterializer<i32>> =
        Arc::new(MaterializedList::new(vec![1, 2, 3, 4, 1]));
    let found = source.drop_while(|v| *v < 3).exists(|v| *v == 1);

    assert!(answer_of(&found));
}
