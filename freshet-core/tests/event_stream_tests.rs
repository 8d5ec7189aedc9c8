// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Async subscription surface: `StreamFuture` consumed as a `futures` stream.

use freshet_core::retention::KeepAll;
use freshet_core::{FreshetError, StreamEvent, StreamFuture};
use futures::StreamExt;

#[tokio::test]
async fn events_arrive_in_order_and_end_with_closed() {
    let stream = StreamFuture::<u32>::new();
    let mut events = stream.subscribe_stream();

    stream.set(1);
    stream.set(2);
    stream.close();

    assert_eq!(events.next().await, Some(StreamEvent::Value(1)));
    assert_eq!(events.next().await, Some(StreamEvent::Value(2)));
    assert!(matches!(events.next().await, Some(StreamEvent::Closed)));
}

#[tokio::test]
async fn history_is_replayed_before_live_events() {
    let stream = StreamFuture::with_retention(Box::new(KeepAll::new()));
    stream.set(1);
    stream.set(2);

    let mut events = stream.subscribe_stream();
    stream.close();

    // 1 is history (recorded when 2 superseded it); 2 stays the snapshot
    assert_eq!(events.next().await, Some(StreamEvent::Value(1)));
    assert!(matches!(events.next().await, Some(StreamEvent::Closed)));
}

#[tokio::test]
async fn subscribe_next_stream_skips_history() {
    let stream = StreamFuture::with_retention(Box::new(KeepAll::new()));
    stream.set(1);
    stream.set(2);

    let mut events = stream.subscribe_next_stream();
    stream.set(3);
    stream.close();

    assert_eq!(events.next().await, Some(StreamEvent::Value(3)));
    assert!(matches!(events.next().await, Some(StreamEvent::Closed)));
}

#[tokio::test]
async fn failure_ends_the_event_stream() {
    let stream = StreamFuture::<u32>::new();
    let mut events = stream.subscribe_stream();

    stream.fail(FreshetError::upstream("boom"));

    match events.next().await {
        Some(StreamEvent::Failed(err)) => {
            assert!(matches!(err, FreshetError::Upstream { .. }));
        }
        other => panic!("expected failure event, got {other:?}"),
    }
}

#[tokio::test]
async fn dropping_the_event_stream_detaches_its_receiver() {
    let stream = StreamFuture::<u32>::new();
    let events = stream.subscribe_stream();

    // Wait for the attach task to run
    while stream.subscriber_count() == 0 {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }

    drop(events);
    while stream.subscriber_count() > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
}
