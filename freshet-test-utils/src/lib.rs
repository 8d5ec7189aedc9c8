// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Freshet streaming-future library.
//!
//! Recorders and latches for asserting against callback-driven APIs from
//! plain test threads: [`RecordingReceiver`] captures a stream's delivery
//! sequence, [`ConsumerLog`] and [`ResultLatch`] capture materializer
//! answers, and [`CountingSource`] counts how often a wrapped materializer
//! is actually pulled. Development and testing only, not production code.

pub mod consumers;
pub mod counting;
pub mod recording;

pub use consumers::{ConsumerLog, ResultLatch};
pub use counting::CountingSource;
pub use recording::{FailingReceiver, RecordingReceiver};
