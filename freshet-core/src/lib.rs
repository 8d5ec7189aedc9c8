// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core of the Freshet streaming-future library.
//!
//! A [`StreamFuture`] is a single-writer, multi-reader container that can
//! hold zero, one or many values over time, replay history to late
//! subscribers through pluggable [retention policies](retention), and
//! terminate exactly once (by close, failure or cancellation), notifying
//! every attached observer exactly once, in order.

pub mod blocking_iter;
pub mod cancellation_token;
pub mod error;
pub mod logging;
pub mod receiver;
pub mod retention;
pub mod scheduler;
pub mod stream_event;
pub mod stream_future;

pub use self::blocking_iter::FutureIter;
pub use self::cancellation_token::CancellationToken;
pub use self::error::{FreshetError, IntoFreshetError, Result, ResultExt};
pub use self::receiver::{Receiver, ReceiverId};
pub use self::retention::{RetentionConfig, RetentionPolicy};
pub use self::scheduler::{Scheduler, SerialQueue, Task, TaskId};
pub use self::stream_event::StreamEvent;
pub use self::stream_future::{EventStream, StreamFuture, StreamStatus, Subscription};
