// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Freshet
//!
//! Streaming futures: a single-writer, multi-subscriber value container
//! with exactly-once terminal transitions, pluggable history retention,
//! blocking and async consumption, and lazy cancellable list materializers
//! layered on top.
//!
//! ## Quick start
//!
//! ```
//! use freshet_rx::StreamFuture;
//! use std::time::Duration;
//!
//! let stream = StreamFuture::<u32>::new();
//! stream.set(1);
//! stream.set(2);
//!
//! // Blocking join on the latest-value snapshot
//! assert_eq!(stream.get_timeout(Duration::from_millis(100)).unwrap(), vec![2]);
//!
//! stream.close();
//! assert!(stream.is_terminated());
//! ```
//!
//! The pieces live in two member crates, re-exported here:
//!
//! - [`freshet_core`]: the [`StreamFuture`] itself, its retention policies,
//!   blocking iterators and the serialized writer queue.
//! - [`freshet_materialize`]: the [`ListMaterializer`] protocol with its
//!   decorator operators and the stream bridge.

pub use freshet_core::{
    CancellationToken, EventStream, FreshetError, FutureIter, IntoFreshetError, Receiver,
    ReceiverId, Result, ResultExt, RetentionConfig, RetentionPolicy, Scheduler, SerialQueue,
    StreamEvent, StreamFuture, StreamStatus, Subscription, Task, TaskId,
};

pub use freshet_materialize::{
    drop_while, exists, from_stream, CancelledMaterializer, DeferredListMaterializer,
    FailedMaterializer, IndexedConsumer, ListMaterializer, ListMaterializerExt, MaterializedList,
    ResultConsumer,
};
