// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{FreshetError, Result};
use freshet_materialize::{IndexedConsumer, ResultConsumer};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct LogState<T> {
    accepted: Vec<(usize, T)>,
    completed: Option<usize>,
    error: Option<FreshetError>,
}

/// Shared log behind an [`IndexedConsumer`]: a test hands out
/// [`consumer`](ConsumerLog::consumer) handles and blocks on
/// [`wait_done`](ConsumerLog::wait_done) before asserting.
pub struct ConsumerLog<T> {
    state: Mutex<LogState<T>>,
    changed: Condvar,
}

impl<T: Clone + Send + 'static> ConsumerLog<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LogState {
                accepted: Vec::new(),
                completed: None,
                error: None,
            }),
            changed: Condvar::new(),
        })
    }

    /// A fresh consumer handle writing into this log.
    pub fn consumer(self: &Arc<Self>) -> Box<dyn IndexedConsumer<T>> {
        Box::new(LoggingConsumer {
            log: Arc::clone(self),
        })
    }

    /// `(index, element)` pairs accepted so far, in arrival order.
    pub fn accepted(&self) -> Vec<(usize, T)> {
        self.state.lock().accepted.clone()
    }

    /// The accepted elements without their indices.
    pub fn values(&self) -> Vec<T> {
        self.state
            .lock()
            .accepted
            .iter()
            .map(|(_, element)| element.clone())
            .collect()
    }

    /// The final size reported by `complete`, if it ran.
    pub fn completed(&self) -> Option<usize> {
        self.state.lock().completed
    }

    pub fn error(&self) -> Option<FreshetError> {
        self.state.lock().error.clone()
    }

    /// Block until `complete` or `error` fired. Returns `false` on timeout.
    pub fn wait_done(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.completed.is_none() && state.error.is_none() {
            if self.changed.wait_until(&mut state, deadline).timed_out() {
                return state.completed.is_some() || state.error.is_some();
            }
        }
        true
    }
}

struct LoggingConsumer<T> {
    log: Arc<ConsumerLog<T>>,
}

impl<T: Clone + Send + 'static> IndexedConsumer<T> for LoggingConsumer<T> {
    fn accept(&mut self, _size: isize, index: usize, element: &T) -> Result<()> {
        let mut state = self.log.state.lock();
        state.accepted.push((index, element.clone()));
        self.log.changed.notify_all();
        Ok(())
    }

    fn complete(&mut self, size: usize) -> Result<()> {
        let mut state = self.log.state.lock();
        state.completed = Some(size);
        self.log.changed.notify_all();
        Ok(())
    }

    fn error(&mut self, _index: Option<usize>, error: &FreshetError) {
        let mut state = self.log.state.lock();
        state.error = Some(error.clone());
        self.log.changed.notify_all();
    }
}

/// One-shot latch behind a [`ResultConsumer`], for the scalar operations.
pub struct ResultLatch<R> {
    slot: Mutex<Option<std::result::Result<R, FreshetError>>>,
    changed: Condvar,
}

impl<R: Clone + Send + 'static> ResultLatch<R> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            changed: Condvar::new(),
        })
    }

    /// A fresh consumer handle resolving this latch.
    pub fn consumer(self: &Arc<Self>) -> Box<dyn ResultConsumer<R>> {
        Box::new(LatchConsumer {
            latch: Arc::clone(self),
        })
    }

    /// Non-blocking read of the answer.
    pub fn peek(&self) -> Option<std::result::Result<R, FreshetError>> {
        self.slot.lock().clone()
    }

    /// Block until the answer arrived. `None` on timeout.
    pub fn wait(&self, timeout: Duration) -> Option<std::result::Result<R, FreshetError>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        while slot.is_none() {
            if self.changed.wait_until(&mut slot, deadline).timed_out() {
                return slot.clone();
            }
        }
        slot.clone()
    }
}

struct LatchConsumer<R> {
    latch: Arc<ResultLatch<R>>,
}

impl<R: Clone + Send + 'static> ResultConsumer<R> for LatchConsumer<R> {
    fn resolved(&mut self, value: R) {
        *self.latch.slot.lock() = Some(Ok(value));
        self.latch.changed.notify_all();
    }

    fn failed(&mut self, error: FreshetError) {
        *self.latch.slot.lock() = Some(Err(error));
        self.latch.changed.notify_all();
    }
}
