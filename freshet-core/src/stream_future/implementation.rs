// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::blocking_iter::{IterShared, IterTerminal};
use crate::error::FreshetError;
use crate::log_warn;
use crate::receiver::{Receiver, ReceiverId};
use crate::retention::RetentionPolicy;
use crate::scheduler::SerialQueue;
use crate::stream_event::StreamEvent;
use futures_channel::mpsc::UnboundedSender;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

pub(crate) const RUNNING: u8 = 0;
pub(crate) const COMPLETING: u8 = 1;
pub(crate) const CLOSED: u8 = 2;
pub(crate) const CANCELLED: u8 = 3;

/// The terminal snapshot, written exactly once inside the terminal task.
#[derive(Clone)]
pub(crate) enum TerminalResult<T> {
    Value(Option<T>),
    Failed(FreshetError),
}

pub(crate) struct StreamState<T: Clone> {
    pub(crate) last_value: Option<T>,
    pub(crate) receivers: Vec<(ReceiverId, Arc<dyn Receiver<T>>)>,
    pub(crate) iterators: Vec<Weak<IterShared<T>>>,
    pub(crate) retention: Box<dyn RetentionPolicy<T>>,
}

pub(crate) struct Inner<T: Clone + Send + 'static> {
    /// Monotonic status word; the only state mutated outside the writer
    /// queue. The terminal store acts as the publication barrier for the
    /// terminal result.
    pub(crate) status: AtomicU8,
    pub(crate) queue: SerialQueue,
    /// Mutated only from within writer-queue tasks; readers (`current`,
    /// `get` fast path) take short read locks.
    pub(crate) state: Mutex<StreamState<T>>,
    pub(crate) terminal: Mutex<Option<TerminalResult<T>>>,
    /// Guards the waiter generation; getters park here until a value or the
    /// terminal result exists.
    pub(crate) wait_lock: Mutex<()>,
    pub(crate) waiters: Condvar,
}

impl<T: Clone + Send + 'static> Inner<T> {
    pub(crate) fn new(retention: Box<dyn RetentionPolicy<T>>) -> Self {
        Self {
            status: AtomicU8::new(RUNNING),
            queue: SerialQueue::new(),
            state: Mutex::new(StreamState {
                last_value: None,
                receivers: Vec::new(),
                iterators: Vec::new(),
                retention,
            }),
            terminal: Mutex::new(None),
            wait_lock: Mutex::new(()),
            waiters: Condvar::new(),
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.status.load(Ordering::Acquire) >= CLOSED
    }

    fn wake_waiters(&self) {
        // Hold the waiter lock while notifying so a getter between its
        // predicate check and its wait cannot miss the wakeup
        let _guard = self.wait_lock.lock();
        self.waiters.notify_all();
    }

    /// Writer slot: record history, update the latest value, fan out.
    pub(crate) fn run_set(&self, values: Vec<T>, bulk: bool) {
        if self.is_terminal() {
            log_warn!("stream already terminated; dropping {} value(s)", values.len());
            return;
        }
        if values.is_empty() {
            return;
        }

        let (receivers, iterators) = {
            let mut state = self.state.lock();
            // The previous latest value and every superseded value of the
            // batch move into history; the final one becomes the latest.
            if let Some(previous) = state.last_value.take() {
                state.retention.record(previous);
            }
            let mut superseded = values.clone();
            let newest = superseded.pop();
            state.retention.record_bulk(superseded);
            state.last_value = newest;

            (state.receivers.clone(), state.iterators.clone())
        };

        // Fan out without the state lock; no other writer task can run
        // concurrently, so the registry cannot change underneath us.
        let mut evicted = Vec::new();
        for (id, receiver) in &receivers {
            let delivery = if bulk {
                receiver.set_bulk(values.clone())
            } else {
                receiver.set(values[0].clone())
            };
            if let Err(error) = delivery {
                receiver.on_receiver_error(&error);
                evicted.push(*id);
            }
        }

        let mut dead_iterators = false;
        for weak in &iterators {
            match weak.upgrade() {
                Some(iter) => {
                    if bulk {
                        iter.push_many(values.clone());
                    } else {
                        iter.push(values[0].clone());
                    }
                }
                None => dead_iterators = true,
            }
        }

        if !evicted.is_empty() || dead_iterators {
            let mut state = self.state.lock();
            state.receivers.retain(|(id, _)| !evicted.contains(id));
            state.iterators.retain(|weak| weak.strong_count() > 0);
        }

        self.wake_waiters();
    }

    /// Writer slot: the terminal transition for `close`.
    pub(crate) fn run_close(&self) {
        self.status.store(CLOSED, Ordering::Release);

        let (snapshot, receivers, iterators) = {
            let mut state = self.state.lock();
            state.retention.close();
            let receivers = std::mem::take(&mut state.receivers);
            let iterators = std::mem::take(&mut state.iterators);
            (state.last_value.clone(), receivers, iterators)
        };

        *self.terminal.lock() = Some(TerminalResult::Value(snapshot));

        for (_, receiver) in receivers {
            if let Err(error) = receiver.close() {
                receiver.on_receiver_error(&error);
            }
        }
        for weak in iterators {
            if let Some(iter) = weak.upgrade() {
                iter.terminate(IterTerminal::Closed);
            }
        }

        self.wake_waiters();
    }

    /// Writer slot: the terminal transition for `fail`/`cancel`.
    pub(crate) fn run_fail(&self, error: FreshetError) {
        self.status.store(CANCELLED, Ordering::Release);

        let (receivers, iterators) = {
            let mut state = self.state.lock();
            state.retention.close();
            let receivers = std::mem::take(&mut state.receivers);
            let iterators = std::mem::take(&mut state.iterators);
            (receivers, iterators)
        };

        *self.terminal.lock() = Some(TerminalResult::Failed(error.clone()));

        for (id, receiver) in receivers {
            if !receiver.fail(error.clone()) {
                log_warn!("receiver {id:?} did not accept terminal failure");
            }
        }
        for weak in iterators {
            if let Some(iter) = weak.upgrade() {
                iter.terminate(IterTerminal::Failed(error.clone()));
            }
        }

        self.wake_waiters();
    }

    /// Writer slot: attach a push receiver, replaying history when asked.
    pub(crate) fn run_attach(
        &self,
        id: ReceiverId,
        receiver: Arc<dyn Receiver<T>>,
        replay: bool,
    ) {
        let terminal = self.terminal.lock().clone();
        if let Some(terminal) = terminal {
            // Late attach: replay, then the terminal signal; never register
            if replay {
                let history = self.state.lock().retention.replay();
                for value in history {
                    if let Err(error) = receiver.set(value) {
                        receiver.on_receiver_error(&error);
                        return;
                    }
                }
            }
            match terminal {
                TerminalResult::Value(_) => {
                    if let Err(error) = receiver.close() {
                        receiver.on_receiver_error(&error);
                    }
                }
                TerminalResult::Failed(error) => {
                    receiver.fail(error);
                }
            }
            return;
        }

        let duplicate = self
            .state
            .lock()
            .receivers
            .iter()
            .any(|(_, existing)| Arc::ptr_eq(existing, &receiver));
        if duplicate {
            log_warn!("receiver {id:?} already registered; ignoring");
            return;
        }

        if replay {
            let history = self.state.lock().retention.replay();
            for value in history {
                if let Err(error) = receiver.set(value) {
                    receiver.on_receiver_error(&error);
                    return;
                }
            }
        }

        self.state.lock().receivers.push((id, receiver));
    }

    /// Writer slot: attach a pull cursor.
    pub(crate) fn run_attach_iter(&self, weak: Weak<IterShared<T>>) {
        let Some(iter) = weak.upgrade() else { return };

        let history = self.state.lock().retention.replay();
        if !history.is_empty() {
            iter.push_many(history);
        }

        match self.terminal.lock().clone() {
            Some(TerminalResult::Value(_)) => iter.terminate(IterTerminal::Closed),
            Some(TerminalResult::Failed(error)) => iter.terminate(IterTerminal::Failed(error)),
            None => self.state.lock().iterators.push(weak),
        }
    }

    pub(crate) fn run_detach(&self, id: ReceiverId) {
        self.state.lock().receivers.retain(|(rid, _)| *rid != id);
    }

    pub(crate) fn run_clear(&self) {
        let mut state = self.state.lock();
        state.last_value = None;
        state.retention.clear();
    }

    fn snapshot_ready(&self) -> Option<Result<Vec<T>, FreshetError>> {
        if let Some(terminal) = self.terminal.lock().as_ref() {
            return Some(match terminal {
                TerminalResult::Value(Some(v)) => Ok(vec![v.clone()]),
                TerminalResult::Value(None) => Ok(Vec::new()),
                TerminalResult::Failed(e) => Err(e.clone()),
            });
        }
        self.state
            .lock()
            .last_value
            .as_ref()
            .map(|v| Ok(vec![v.clone()]))
    }

    /// Park the caller until a value or the terminal result exists.
    pub(crate) fn block_on_snapshot(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Vec<T>, FreshetError> {
        // Fast path; after termination this never touches the scheduler
        if let Some(ready) = self.snapshot_ready() {
            return ready;
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut guard = self.wait_lock.lock();
        loop {
            if let Some(ready) = self.snapshot_ready() {
                return ready;
            }
            match deadline {
                None => self.waiters.wait(&mut guard),
                Some(deadline) => {
                    if self.waiters.wait_until(&mut guard, deadline).timed_out() {
                        return self.snapshot_ready().unwrap_or_else(|| {
                            Err(FreshetError::timeout(format!(
                                "no value within {timeout:?}"
                            )))
                        });
                    }
                }
            }
        }
    }
}

/// Receiver bridging the push contract onto an unbounded channel, backing
/// the async subscription streams. A dropped stream makes `set` fail, which
/// gets this receiver evicted on the next delivery.
pub(crate) struct ChannelReceiver<T> {
    tx: UnboundedSender<StreamEvent<T>>,
}

impl<T> ChannelReceiver<T> {
    pub(crate) fn new(tx: UnboundedSender<StreamEvent<T>>) -> Self {
        Self { tx }
    }

    fn forward(&self, event: StreamEvent<T>) -> Result<(), FreshetError> {
        self.tx
            .unbounded_send(event)
            .map_err(|_| FreshetError::upstream("subscription stream dropped"))
    }
}

impl<T: Clone + Send + 'static> Receiver<T> for ChannelReceiver<T> {
    fn set(&self, value: T) -> Result<(), FreshetError> {
        self.forward(StreamEvent::Value(value))
    }

    fn fail(&self, error: FreshetError) -> bool {
        self.forward(StreamEvent::Failed(error)).is_ok()
    }

    fn close(&self) -> Result<(), FreshetError> {
        self.forward(StreamEvent::Closed)
    }

    fn on_receiver_error(&self, _error: &FreshetError) {
        // A dropped subscription stream is normal teardown, not a fault
    }
}
