// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The streaming future: a single-writer, multi-reader value container.
//!
//! A [`StreamFuture`] holds zero, one, or many values over time, delivers
//! them to dynamically attached subscribers in order, supports blocking and
//! iterator-based consumption, and propagates cancellation or failure to
//! all observers exactly once.
//!
//! All mutation is confined to the instance's serial writer queue:
//! multi-threaded callers only *request* changes; the actual state update,
//! the fan-out and the history-policy update always happen inside one
//! serialized execution slot. That confinement, plus a CAS-guarded
//! monotonic status word, is what makes "notify everyone exactly once, in
//! order" hold without a global lock.
//!
//! ## Example
//!
//! ```
//! use freshet_core::StreamFuture;
//! use std::time::Duration;
//!
//! let stream = StreamFuture::<&str>::new();
//! stream.set("a");
//! stream.set("b");
//!
//! // `get` resolves with the latest-value snapshot
//! assert_eq!(stream.get_timeout(Duration::from_millis(100)).unwrap(), vec!["b"]);
//!
//! stream.close();
//! assert_eq!(stream.current().unwrap(), "b");
//! ```

pub(crate) mod implementation;

use crate::blocking_iter::{FutureIter, IterShared};
use crate::error::{FreshetError, Result};
use crate::log_warn;
use crate::receiver::{Receiver, ReceiverId};
use crate::retention::{KeepNone, RetentionConfig, RetentionPolicy};
use crate::scheduler::{Scheduler, Task};
use crate::stream_event::StreamEvent;
use futures::Stream;
use futures_channel::mpsc::{self, UnboundedReceiver};
use implementation::{Inner, CLOSED, COMPLETING, RUNNING};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Lifecycle of a [`StreamFuture`].
///
/// The status is monotonic: `Running → Completing → {Closed | Cancelled}`,
/// and exactly one of the two terminal states is ever reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Accepting values and terminal requests.
    Running,
    /// A terminating task has been admitted but not yet executed.
    Completing,
    /// Completed normally.
    Closed,
    /// Terminated by failure or cancellation.
    Cancelled,
}

/// Single-writer, multi-subscriber asynchronous value/event container.
///
/// Cheap to clone; all clones share the same state. See the
/// [module documentation](self) for the execution model.
pub struct StreamFuture<T: Clone + Send + 'static> {
    inner: Arc<Inner<T>>,
}

impl<T: Clone + Send + 'static> StreamFuture<T> {
    /// Create a stream that retains no history (late subscribers only see
    /// live values).
    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(Box::new(KeepNone))
    }

    /// Create a stream with an explicit retention policy.
    #[must_use]
    pub fn with_retention(retention: Box<dyn RetentionPolicy<T>>) -> Self {
        Self {
            inner: Arc::new(Inner::new(retention)),
        }
    }

    /// Create a stream from property-driven retention parameters.
    #[must_use]
    pub fn with_config(config: RetentionConfig) -> Self {
        Self::with_retention(config.into_policy())
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> StreamStatus {
        match self.inner.status.load(Ordering::Acquire) {
            RUNNING => StreamStatus::Running,
            COMPLETING => StreamStatus::Completing,
            CLOSED => StreamStatus::Closed,
            _ => StreamStatus::Cancelled,
        }
    }

    /// `true` once the stream reached `Closed` or `Cancelled`.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.inner.is_terminal()
    }

    /// Number of currently attached push receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().receivers.len()
    }

    /// Set a new value.
    ///
    /// The previous latest value moves into the retention history; the new
    /// value is fanned out to every attached receiver and live iterator in
    /// registration order. After termination this is a logged no-op.
    pub fn set(&self, value: T) {
        if self.inner.is_terminal() {
            log_warn!("set on a terminated stream ignored");
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner.queue.submit(Task::new(move |token| {
            if token.is_cancelled() {
                return;
            }
            inner.run_set(vec![value], false);
        }));
    }

    /// Set a batch of values, delivered in order within one writer slot.
    pub fn set_bulk(&self, values: Vec<T>) {
        if values.is_empty() {
            return;
        }
        if self.inner.is_terminal() {
            log_warn!("set_bulk on a terminated stream ignored");
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner
            .queue
            .submit(Task::with_weight(values.len() as u32, move |token| {
                if token.is_cancelled() {
                    return;
                }
                inner.run_set(values, true);
            }));
    }

    /// Complete the stream normally.
    ///
    /// Admitted only from `Running`; concurrent `close`/`fail` calls race
    /// for a single CAS and exactly one wins. Every observer attached at
    /// the transition is notified exactly once and evicted.
    pub fn close(&self) {
        if !self.begin_termination() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner
            .queue
            .submit_first(Task::new(move |_| inner.run_close()));
    }

    /// Terminate the stream with a failure.
    ///
    /// A [`FreshetError::Cancelled`] cause makes blocked joins observe
    /// cancellation; any other cause is re-raised (wrapped) to them.
    pub fn fail(&self, error: FreshetError) {
        if !self.begin_termination() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner
            .queue
            .submit_first(Task::new(move |_| inner.run_fail(error)));
    }

    /// Cancel the stream.
    ///
    /// Equivalent to `fail(FreshetError::Cancelled)` plus a best-effort
    /// interrupt of the in-flight writer task.
    pub fn cancel(&self) {
        if let Some(running) = self.inner.queue.running_task() {
            self.inner.queue.interrupt(running);
        }
        self.fail(FreshetError::Cancelled);
    }

    /// Block until a value or the terminal result is available.
    ///
    /// Returns the latest-value snapshot: one element once anything was
    /// set, empty if the stream closed without a value.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the stream was cancelled, the wrapped cause if it
    /// failed.
    pub fn get(&self) -> Result<Vec<T>> {
        self.inner.block_on_snapshot(None)
    }

    /// Like [`get`](Self::get), giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// `Timeout` if the deadline elapses first.
    pub fn get_timeout(&self, timeout: Duration) -> Result<Vec<T>> {
        self.inner.block_on_snapshot(Some(timeout))
    }

    /// Non-blocking read of the latest value.
    ///
    /// # Errors
    ///
    /// `NoElement` if nothing was ever set (or [`clear`](Self::clear) ran
    /// last).
    pub fn current(&self) -> Result<T> {
        self.inner
            .state
            .lock()
            .last_value
            .clone()
            .ok_or(FreshetError::NoElement)
    }

    /// Non-blocking read of the latest value, with a default.
    #[must_use]
    pub fn current_or(&self, default: T) -> T {
        self.inner
            .state
            .lock()
            .last_value
            .clone()
            .unwrap_or(default)
    }

    /// Attach a blocking pull cursor.
    ///
    /// The cursor first replays whatever the retention policy recommends,
    /// then receives live values, and reports end-of-data on close or the
    /// terminal failure on cancellation/error.
    #[must_use]
    pub fn iter(&self) -> FutureIter<T> {
        self.attach_iter(None)
    }

    /// Like [`iter`](Self::iter) with an overall budget shared by all of
    /// the cursor's blocking calls; the budget shrinks as they wait.
    #[must_use]
    pub fn iter_timeout(&self, budget: Duration) -> FutureIter<T> {
        self.attach_iter(Some(budget))
    }

    /// Attach a push receiver, replaying retained history first.
    ///
    /// Duplicate registration of the same receiver (same `Arc` identity) is
    /// a no-op. The returned [`Subscription`] detaches the receiver when
    /// dropped or explicitly unsubscribed.
    pub fn subscribe(&self, receiver: Arc<dyn Receiver<T>>) -> Subscription<T> {
        self.attach(receiver, true)
    }

    /// Attach a push receiver without history replay: live values and the
    /// terminal signal only.
    pub fn subscribe_next(&self, receiver: Arc<dyn Receiver<T>>) -> Subscription<T> {
        self.attach(receiver, false)
    }

    /// Subscribe as an async stream of [`StreamEvent`]s, history included.
    #[must_use]
    pub fn subscribe_stream(&self) -> EventStream<T> {
        self.attach_stream(true)
    }

    /// Subscribe as an async stream of [`StreamEvent`]s, live values only.
    #[must_use]
    pub fn subscribe_next_stream(&self) -> EventStream<T> {
        self.attach_stream(false)
    }

    /// Detach a receiver by id; no-op if absent.
    ///
    /// Runs as a control-plane task that cuts ahead of queued deliveries.
    pub fn unsubscribe(&self, id: ReceiverId) {
        let inner = Arc::clone(&self.inner);
        self.inner
            .queue
            .submit_first(Task::new(move |_| inner.run_detach(id)));
    }

    /// Drop the current value and ask the retention policy to forget
    /// everything. Subscribers and terminal status are unaffected.
    pub fn clear(&self) {
        let inner = Arc::clone(&self.inner);
        self.inner.queue.submit(Task::new(move |_| inner.run_clear()));
    }

    fn begin_termination(&self) -> bool {
        let admitted = self
            .inner
            .status
            .compare_exchange(RUNNING, COMPLETING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !admitted {
            log_warn!("terminal transition already requested; ignoring");
        }
        admitted
    }

    fn attach(&self, receiver: Arc<dyn Receiver<T>>, replay: bool) -> Subscription<T> {
        let id = ReceiverId::fresh();
        let inner = Arc::clone(&self.inner);
        self.inner
            .queue
            .submit(Task::new(move |_| inner.run_attach(id, receiver, replay)));
        Subscription {
            inner: Arc::clone(&self.inner),
            id,
            released: AtomicBool::new(false),
        }
    }

    fn attach_stream(&self, replay: bool) -> EventStream<T> {
        let (tx, rx) = mpsc::unbounded();
        let receiver: Arc<dyn Receiver<T>> =
            Arc::new(implementation::ChannelReceiver::new(tx));
        let subscription = self.attach(receiver, replay);
        EventStream {
            _subscription: subscription,
            rx,
        }
    }

    fn attach_iter(&self, budget: Option<Duration>) -> FutureIter<T> {
        let shared = Arc::new(IterShared::new());
        let weak = Arc::downgrade(&shared);
        let inner = Arc::clone(&self.inner);
        self.inner
            .queue
            .submit(Task::new(move |_| inner.run_attach_iter(weak)));
        FutureIter::new(shared, budget)
    }
}

impl<T: Clone + Send + 'static> Default for StreamFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Clone for StreamFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Registration handle returned by `subscribe`/`subscribe_next`.
///
/// Dropping the handle detaches the receiver; this replaces the weakly-held
/// registries of classic implementations with a deterministic lifetime.
pub struct Subscription<T: Clone + Send + 'static> {
    inner: Arc<Inner<T>>,
    id: ReceiverId,
    released: AtomicBool,
}

impl<T: Clone + Send + 'static> Subscription<T> {
    /// The registered receiver's identity.
    #[must_use]
    pub fn id(&self) -> ReceiverId {
        self.id
    }

    /// Explicitly detach the receiver.
    pub fn unsubscribe(self) {
        self.release();
    }

    /// Keep the receiver attached for the stream's whole lifetime, even
    /// after this handle is dropped.
    pub fn detach(self) {
        self.released.store(true, Ordering::Release);
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            let id = self.id;
            let inner = Arc::clone(&self.inner);
            let queue = self.inner.queue.clone();
            queue.submit_first(Task::new(move |_| inner.run_detach(id)));
        }
    }
}

impl<T: Clone + Send + 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Async subscription surface: a `Stream` of [`StreamEvent`]s.
///
/// Exactly one `Closed` or `Failed` event ends the stream; dropping it
/// detaches the underlying receiver.
pub struct EventStream<T: Clone + Send + 'static> {
    _subscription: Subscription<T>,
    rx: UnboundedReceiver<StreamEvent<T>>,
}

impl<T: Clone + Send + 'static> Stream for EventStream<T> {
    type Item = StreamEvent<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}
