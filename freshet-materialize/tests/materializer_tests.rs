// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal views and the deferred single-flight engine.

use freshet_core::FreshetError;
use freshet_materialize::{
    CancelledMaterializer, DeferredListMaterializer, FailedMaterializer, ListMaterializer,
    MaterializedList, ResolveCtx,
};
use freshet_test_utils::{ConsumerLog, ResultLatch};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const LONG: Duration = Duration::from_secs(2);

fn realized(elements: Vec<i32>) -> Arc<dyn ListMaterializer<i32>> {
    Arc::new(MaterializedList::new(elements))
}

#[test]
fn materialized_list_answers_all_questions() {
    let list = realized(vec![10, 20, 30]);
    assert_eq!(list.known_size(), 3);
    assert!(list.is_done());
    assert!(!list.is_failed());
    assert!(!list.is_cancelled());

    let log = ConsumerLog::new();
    list.materialize_element(1, log.consumer());
    assert_eq!(log.accepted(), vec![(1, 20)]);

    let size = ResultLatch::new();
    list.materialize_size(size.consumer());
    assert!(matches!(size.peek(), Some(Ok(3))));

    let empty = ResultLatch::new();
    list.materialize_empty(empty.consumer());
    assert!(matches!(empty.peek(), Some(Ok(false))));

    let contains = ResultLatch::new();
    list.materialize_contains(20, contains.consumer());
    assert!(matches!(contains.peek(), Some(Ok(true))));

    let absent = ResultLatch::new();
    list.materialize_contains(99, absent.consumer());
    assert!(matches!(absent.peek(), Some(Ok(false))));
}

#[test]
fn full_walk_delivers_elements_then_completes() {
    let list = realized(vec![1, 2, 3]);
    let log = ConsumerLog::new();
    list.materialize_elements(log.consumer());

    assert_eq!(log.values(), vec![1, 2, 3]);
    assert_eq!(log.completed(), Some(3));
    assert!(log.error().is_none());
}

#[test]
fn element_past_the_end_completes_instead_of_failing() {
    let list = realized(vec![1, 2]);
    let log = ConsumerLog::new();
    list.materialize_element(2, log.consumer());

    assert!(log.accepted().is_empty());
    assert_eq!(log.completed(), Some(2));
}

#[test]
fn negative_index_reports_invalid_index() {
    let list = realized(vec![1, 2]);
    let log = ConsumerLog::new();
    list.materialize_element(-1, log.consumer());

    assert!(matches!(
        log.error(),
        Some(FreshetError::InvalidIndex { index: -1 })
    ));
}

#[test]
fn failed_view_reports_its_cause_everywhere() {
    let failed = FailedMaterializer::new(FreshetError::upstream("boom"));
    assert!(ListMaterializer::<i32>::is_failed(&failed));
    assert!(!ListMaterializer::<i32>::is_cancelled(&failed));
    assert_eq!(ListMaterializer::<i32>::known_size(&failed), -1);

    let log = ConsumerLog::<i32>::new();
    failed.materialize_elements(log.consumer());
    assert!(matches!(log.error(), Some(FreshetError::Upstream { .. })));

    let size = ResultLatch::new();
    ListMaterializer::<i32>::materialize_size(&failed, size.consumer());
    assert!(matches!(size.peek(), Some(Err(FreshetError::Upstream { .. }))));
}

#[test]
fn cancelled_view_is_distinct_from_failure() {
    let cancelled = CancelledMaterializer::default();
    assert!(ListMaterializer::<i32>::is_cancelled(&cancelled));
    assert!(!ListMaterializer::<i32>::is_failed(&cancelled));

    let latch = ResultLatch::<bool>::new();
    ListMaterializer::<i32>::materialize_empty(&cancelled, latch.consumer());
    assert!(matches!(latch.peek(), Some(Err(err)) if err.is_cancellation()));
}

#[test]
fn first_caller_triggers_exactly_one_resolution() {
    let resolutions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&resolutions);
    let deferred = Arc::new(DeferredListMaterializer::new(
        move |ctx: ResolveCtx<i32>| {
            counter.fetch_add(1, Ordering::AcqRel);
            ctx.complete(Arc::new(MaterializedList::new(vec![1, 2, 3])));
        },
        |_| {},
    ));

    assert_eq!(deferred.known_size(), -1);
    assert!(!deferred.is_done());

    let mut handles = Vec::new();
    let mut logs = Vec::new();
    for _ in 0..8 {
        let target = Arc::clone(&deferred);
        let log = ConsumerLog::new();
        logs.push(Arc::clone(&log));
        handles.push(thread::spawn(move || {
            target.materialize_element(0, log.consumer());
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(resolutions.load(Ordering::Acquire), 1);
    for log in logs {
        assert_eq!(log.accepted(), vec![(0, 1)]);
    }
    assert!(deferred.is_done());
    assert_eq!(deferred.known_size(), 3);
}

#[test]
fn callers_queued_before_resolution_are_flushed() {
    let slot: Arc<Mutex<Option<ResolveCtx<i32>>>> = Arc::new(Mutex::new(None));
    let stash = Arc::clone(&slot);
    let deferred = DeferredListMaterializer::new(
        move |ctx| {
            *stash.lock() = Some(ctx);
        },
        |_| {},
    );

    let done = ResultLatch::new();
    deferred.materialize_done(done.consumer());
    let size = ResultLatch::new();
    deferred.materialize_size(size.consumer());
    assert!(done.peek().is_none());

    let ctx = slot.lock().take().unwrap();
    ctx.complete(Arc::new(MaterializedList::new(vec![7])));

    assert!(matches!(done.wait(LONG), Some(Ok(()))));
    assert!(matches!(size.wait(LONG), Some(Ok(1))));
}

#[test]
fn resolution_failure_produces_a_failed_view() {
    let deferred = DeferredListMaterializer::<i32>::new(
        |ctx| ctx.fail(FreshetError::upstream("fetch failed")),
        |_| {},
    );

    let log = ConsumerLog::new();
    deferred.materialize_elements(log.consumer());
    assert!(matches!(log.error(), Some(FreshetError::Upstream { .. })));
    assert!(deferred.is_failed());
    assert!(!deferred.is_cancelled());
}

#[test]
fn cancel_wins_over_a_late_completion() {
    let slot: Arc<Mutex<Option<ResolveCtx<i32>>>> = Arc::new(Mutex::new(None));
    let stash = Arc::clone(&slot);
    let deferred = DeferredListMaterializer::new(
        move |ctx| {
            *stash.lock() = Some(ctx);
        },
        |_| {},
    );

    let latch = ResultLatch::new();
    deferred.materialize_size(latch.consumer());
    deferred.materialize_cancel(FreshetError::Cancelled);

    assert!(matches!(latch.peek(), Some(Err(err)) if err.is_cancellation()));
    assert!(deferred.is_cancelled());

    // The stale resolution arrives too late to change anything
    let ctx = slot.lock().take().unwrap();
    ctx.complete(Arc::new(MaterializedList::new(vec![1])));
    assert!(deferred.is_cancelled());
    assert_eq!(deferred.known_size(), -1);
}

#[test]
fn cancel_notifies_the_cancellation_hook_once() {
    let notified = Arc::new(AtomicUsize::new(0));
    let hook = Arc::clone(&notified);
    let deferred = DeferredListMaterializer::<i32>::new(
        |_ctx| {},
        move |_error| {
            hook.fetch_add(1, Ordering::AcqRel);
        },
    );

    deferred.materialize_cancel(FreshetError::Cancelled);
    deferred.materialize_cancel(FreshetError::Cancelled);
    assert_eq!(notified.load(Ordering::Acquire), 1);
}
