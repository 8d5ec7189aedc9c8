// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The bridge between `StreamFuture` termination and list materialization.

use freshet_core::{FreshetError, StreamFuture};
use freshet_materialize::from_stream;
use freshet_test_utils::{ConsumerLog, ResultLatch};
use std::thread;
use std::time::{Duration, Instant};

const LONG: Duration = Duration::from_secs(2);

fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

#[test]
fn closed_stream_materializes_its_snapshot() {
    let stream = StreamFuture::<u32>::new();
    stream.set(41);
    stream.set(42);
    stream.close();
    assert!(wait_until(LONG, || stream.is_terminated()));

    let materialized = from_stream(&stream);
    let log = ConsumerLog::new();
    materialized.materialize_elements(log.consumer());

    assert!(log.wait_done(LONG));
    assert_eq!(log.values(), vec![42]);
    assert_eq!(log.completed(), Some(1));
}

#[test]
fn close_without_value_materializes_empty() {
    let stream = StreamFuture::<u32>::new();
    stream.close();
    assert!(wait_until(LONG, || stream.is_terminated()));

    let materialized = from_stream(&stream);
    let empty = ResultLatch::new();
    materialized.materialize_empty(empty.consumer());

    assert!(matches!(empty.wait(LONG), Some(Ok(true))));
}

#[test]
fn materializer_stays_pending_until_the_stream_terminates() {
    let stream = StreamFuture::<u32>::new();
    let materialized = from_stream(&stream);

    let done = ResultLatch::new();
    materialized.materialize_done(done.consumer());
    assert!(done.peek().is_none());
    assert!(!materialized.is_done());

    stream.set(7);
    stream.close();

    assert!(matches!(done.wait(LONG), Some(Ok(()))));
    assert_eq!(materialized.known_size(), 1);
}

#[test]
fn stream_failure_materializes_as_failure() {
    let stream = StreamFuture::<u32>::new();
    let materialized = from_stream(&stream);

    let done = ResultLatch::new();
    materialized.materialize_done(done.consumer());
    stream.fail(FreshetError::upstream("producer went away"));

    assert!(matches!(
        done.wait(LONG),
        Some(Err(FreshetError::Upstream { .. }))
    ));
    assert!(materialized.is_failed());
}

#[test]
fn cancelling_the_materializer_cancels_the_stream() {
    let stream = StreamFuture::<u32>::new();
    let materialized = from_stream(&stream);

    materialized.materialize_cancel(FreshetError::Cancelled);

    assert!(materialized.is_cancelled());
    assert!(wait_until(LONG, || stream.is_terminated()));
    assert!(stream.get_timeout(LONG).unwrap_err().is_cancellation());
}
