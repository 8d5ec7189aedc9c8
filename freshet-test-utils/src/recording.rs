// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{FreshetError, Receiver, Result, StreamEvent};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A [`Receiver`] that records every delivery and lets a test thread block
/// until the stream has said enough.
pub struct RecordingReceiver<T> {
    log: Mutex<Vec<StreamEvent<T>>>,
    changed: Condvar,
}

impl<T: Clone + Send + Sync> RecordingReceiver<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
            changed: Condvar::new(),
        })
    }

    /// Everything delivered so far, in delivery order.
    pub fn events(&self) -> Vec<StreamEvent<T>> {
        self.log.lock().clone()
    }

    /// The values delivered so far, terminal events filtered out.
    pub fn values(&self) -> Vec<T> {
        self.log
            .lock()
            .iter()
            .filter_map(|event| match event {
                StreamEvent::Value(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_terminated(&self) -> bool {
        self.log
            .lock()
            .last()
            .is_some_and(StreamEvent::is_terminal)
    }

    /// Block until at least `count` events arrived. Returns `false` on
    /// timeout.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut log = self.log.lock();
        while log.len() < count {
            if self.changed.wait_until(&mut log, deadline).timed_out() {
                return log.len() >= count;
            }
        }
        true
    }

    /// Block until a terminal event arrived. Returns `false` on timeout.
    pub fn wait_for_terminal(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut log = self.log.lock();
        loop {
            if log.last().is_some_and(StreamEvent::is_terminal) {
                return true;
            }
            if self.changed.wait_until(&mut log, deadline).timed_out() {
                return log.last().is_some_and(StreamEvent::is_terminal);
            }
        }
    }

    fn push(&self, event: StreamEvent<T>) {
        self.log.lock().push(event);
        self.changed.notify_all();
    }
}

impl<T: Clone + Send + Sync> Receiver<T> for RecordingReceiver<T> {
    fn set(&self, value: T) -> Result<()> {
        self.push(StreamEvent::Value(value));
        Ok(())
    }

    fn fail(&self, error: FreshetError) -> bool {
        self.push(StreamEvent::Failed(error));
        true
    }

    fn close(&self) -> Result<()> {
        self.push(StreamEvent::Closed);
        Ok(())
    }
}

/// A [`Receiver`] that starts failing from its `fail_at`-th delivery, for
/// eviction and isolation tests.
pub struct FailingReceiver {
    fail_at: usize,
    seen: AtomicUsize,
    reported: AtomicUsize,
}

impl FailingReceiver {
    /// Fails every delivery once `fail_at` values were seen (0 fails
    /// immediately).
    pub fn new(fail_at: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_at,
            seen: AtomicUsize::new(0),
            reported: AtomicUsize::new(0),
        })
    }

    /// Values successfully accepted before the failures started.
    pub fn accepted(&self) -> usize {
        self.seen.load(Ordering::Acquire).min(self.fail_at)
    }

    /// How often the stream routed a failure back through
    /// `on_receiver_error`.
    pub fn reported_errors(&self) -> usize {
        self.reported.load(Ordering::Acquire)
    }
}

impl<T: Send + Sync> Receiver<T> for FailingReceiver {
    fn set(&self, _value: T) -> Result<()> {
        if self.seen.fetch_add(1, Ordering::AcqRel) >= self.fail_at {
            return Err(FreshetError::upstream("receiver rejected value"));
        }
        Ok(())
    }

    fn fail(&self, _error: FreshetError) -> bool {
        true
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn on_receiver_error(&self, _error: &FreshetError) {
        self.reported.fetch_add(1, Ordering::AcqRel);
    }
}
