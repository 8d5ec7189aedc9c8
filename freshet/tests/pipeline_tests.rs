// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Whole-pipeline coverage through the umbrella crate: stream in,
//! subscription and materializer out.

use freshet_rx::{
    from_stream, FreshetError, ListMaterializerExt, RetentionConfig, StreamEvent, StreamFuture,
};
use freshet_test_utils::{ConsumerLog, RecordingReceiver, ResultLatch};
use futures::StreamExt;
use std::time::Duration;

const LONG: Duration = Duration::from_secs(2);

#[test]
fn stream_to_materializer_pipeline() {
    let stream = StreamFuture::with_config(RetentionConfig {
        max_count: Some(4),
        ..RetentionConfig::default()
    });

    let recorder = RecordingReceiver::new();
    let subscription = stream.subscribe(recorder.clone());

    stream.set(1);
    stream.set(2);
    stream.set(3);
    stream.close();

    assert!(recorder.wait_for_terminal(LONG));
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert!(recorder.is_terminated());
    drop(subscription);

    // The terminal snapshot flows into the materializer world
    let snapshot = from_stream(&stream);
    let log = ConsumerLog::new();
    snapshot.materialize_elements(log.consumer());
    assert!(log.wait_done(LONG));
    assert_eq!(log.values(), vec![3]);

    let found = snapshot.exists(|v| *v == 3);
    let latch = ResultLatch::new();
    found.materialize_contains(true, latch.consumer());
    assert!(matches!(latch.wait(LONG), Some(Ok(true))));
}

#[test]
fn drop_while_over_a_materialized_sequence() {
    let source: std::sync::Arc<dyn freshet_rx::ListMaterializer<i32>> =
        std::sync::Arc::new(freshet_rx::MaterializedList::new(vec![1, 2, 3, 4, 1]));

    let log = ConsumerLog::new();
    source.drop_while(|v| *v < 3).materialize_elements(log.consumer());
    assert_eq!(log.values(), vec![3, 4, 1]);
}

#[tokio::test]
async fn async_subscription_through_the_umbrella() {
    let stream = StreamFuture::<u32>::new();
    let mut events = stream.subscribe_stream();

    stream.set(5);
    stream.fail(FreshetError::upstream("boom"));

    assert_eq!(events.next().await, Some(StreamEvent::Value(5)));
    assert!(matches!(
        events.next().await,
        Some(StreamEvent::Failed(FreshetError::Upstream { .. }))
    ));
}
