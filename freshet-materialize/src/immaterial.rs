// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The shared pending-state engine behind every decorator operator.
//!
//! A [`DeferredListMaterializer`] starts *immaterial*: it holds a queue of
//! callers that arrived before the answer exists. The first caller triggers
//! exactly one resolution of the wrapped source; concurrent callers are
//! appended to the queue and satisfied by that single resolution's outcome,
//! so no duplicate work is ever issued for the same question. On resolution
//! the engine swaps in a concrete terminal view exactly once (first outcome
//! sticks) and drains the queue against it; every later call is answered
//! synchronously by the terminal view.
//!
//! Resolution steps run on the engine's serial queue, which keeps
//! element-by-element walks over synchronous sources iterative instead of
//! recursive.

use crate::consumer::{IndexedConsumer, ResultConsumer};
use crate::logging::log_warn;
use crate::materialized::{CancelledMaterializer, FailedMaterializer};
use crate::materializer::ListMaterializer;
use freshet_core::scheduler::{Scheduler, SerialQueue, Task};
use freshet_core::FreshetError;
use parking_lot::Mutex;
use std::sync::Arc;

enum QueuedCall<T> {
    Element(isize, Box<dyn IndexedConsumer<T>>),
    Elements(Box<dyn IndexedConsumer<T>>),
    Contains(T, Box<dyn ResultConsumer<bool>>),
    Size(Box<dyn ResultConsumer<usize>>),
    Empty(Box<dyn ResultConsumer<bool>>),
    Done(Box<dyn ResultConsumer<()>>),
}

enum EngineState<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// No demand yet.
    Pending(Vec<QueuedCall<T>>),
    /// The single resolution is running; callers queue up behind it.
    InFlight(Vec<QueuedCall<T>>),
    /// Resolved; answers are synchronous from here on.
    Terminal(Arc<dyn ListMaterializer<T>>),
}

struct DeferredInner<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    queue: SerialQueue,
    state: Mutex<EngineState<T>>,
    on_demand: Mutex<Option<Box<dyn FnOnce(ResolveCtx<T>) + Send>>>,
    on_cancel: Mutex<Option<Box<dyn FnOnce(&FreshetError) + Send>>>,
}

/// Handle a resolution uses to schedule its steps and deliver its outcome.
pub struct ResolveCtx<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    inner: Arc<DeferredInner<T>>,
}

impl<T> Clone for ResolveCtx<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ResolveCtx<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Run a resolution step on the engine's serial queue.
    ///
    /// Steps scheduled from within a step are drained by the active pump,
    /// which keeps long walks flat on the stack.
    pub fn schedule(&self, step: impl FnOnce() + Send + 'static) {
        self.inner.queue.submit(Task::new(move |_| step()));
    }

    /// Deliver the terminal materializer and flush all queued callers.
    ///
    /// The first outcome sticks; later attempts are logged no-ops.
    pub fn complete(&self, terminal: Arc<dyn ListMaterializer<T>>) {
        finalize(&self.inner, terminal);
    }

    /// Deliver a terminal failure.
    ///
    /// A cancellation cause produces a cancellation view, anything else a
    /// failure view.
    pub fn fail(&self, error: FreshetError) {
        let terminal: Arc<dyn ListMaterializer<T>> = if error.is_cancellation() {
            Arc::new(CancelledMaterializer::new(error))
        } else {
            Arc::new(FailedMaterializer::new(error))
        };
        finalize(&self.inner, terminal);
    }
}

fn finalize<T>(inner: &Arc<DeferredInner<T>>, terminal: Arc<dyn ListMaterializer<T>>)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let queued = {
        let mut state = inner.state.lock();
        match &mut *state {
            EngineState::Terminal(_) => {
                log_warn!("materializer already terminal; dropping late outcome");
                return;
            }
            EngineState::Pending(queued) | EngineState::InFlight(queued) => {
                let queued = std::mem::take(queued);
                *state = EngineState::Terminal(Arc::clone(&terminal));
                queued
            }
        }
    };

    // Flush outside the lock, in arrival order
    for call in queued {
        dispatch(&terminal, call);
    }
}

fn dispatch<T>(terminal: &Arc<dyn ListMaterializer<T>>, call: QueuedCall<T>)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    match call {
        QueuedCall::Element(index, consumer) => terminal.materialize_element(index, consumer),
        QueuedCall::Elements(consumer) => terminal.materialize_elements(consumer),
        QueuedCall::Contains(value, consumer) => terminal.materialize_contains(value, consumer),
        QueuedCall::Size(consumer) => terminal.materialize_size(consumer),
        QueuedCall::Empty(consumer) => terminal.materialize_empty(consumer),
        QueuedCall::Done(consumer) => terminal.materialize_done(consumer),
    }
}

/// Generic immaterial-to-terminal materializer.
///
/// Parameterized by two hooks: `on_demand`, invoked once on the engine's
/// serial queue when the first caller arrives, computes the terminal state
/// from the wrapped source and delivers it through the [`ResolveCtx`];
/// `on_cancel` propagates cancellation into the wrapped source before this
/// materializer finalizes its own cancellation view.
pub struct DeferredListMaterializer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    inner: Arc<DeferredInner<T>>,
}

impl<T> DeferredListMaterializer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(
        on_demand: impl FnOnce(ResolveCtx<T>) + Send + 'static,
        on_cancel: impl FnOnce(&FreshetError) + Send + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(DeferredInner {
                queue: SerialQueue::new(),
                state: Mutex::new(EngineState::Pending(Vec::new())),
                on_demand: Mutex::new(Some(Box::new(on_demand))),
                on_cancel: Mutex::new(Some(Box::new(on_cancel))),
            }),
        }
    }

    fn push_call(&self, call: QueuedCall<T>) {
        enum Next<T>
        where
            T: Clone + PartialEq + Send + Sync + 'static,
        {
            Dispatch(Arc<dyn ListMaterializer<T>>, QueuedCall<T>),
            Start,
            Wait,
        }

        let next = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                EngineState::Terminal(terminal) => Next::Dispatch(Arc::clone(terminal), call),
                EngineState::Pending(queued) => {
                    queued.push(call);
                    let queued = std::mem::take(queued);
                    *state = EngineState::InFlight(queued);
                    Next::Start
                }
                EngineState::InFlight(queued) => {
                    queued.push(call);
                    Next::Wait
                }
            }
        };

        match next {
            Next::Dispatch(terminal, call) => dispatch(&terminal, call),
            Next::Start => {
                if let Some(on_demand) = self.inner.on_demand.lock().take() {
                    let ctx = ResolveCtx {
                        inner: Arc::clone(&self.inner),
                    };
                    self.inner
                        .queue
                        .submit(Task::new(move |_| on_demand(ctx)));
                }
            }
            Next::Wait => {}
        }
    }
}

impl<T> ListMaterializer<T> for DeferredListMaterializer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn known_size(&self) -> isize {
        match &*self.inner.state.lock() {
            EngineState::Terminal(terminal) => terminal.known_size(),
            _ => -1,
        }
    }

    fn is_done(&self) -> bool {
        matches!(&*self.inner.state.lock(), EngineState::Terminal(_))
    }

    fn is_cancelled(&self) -> bool {
        match &*self.inner.state.lock() {
            EngineState::Terminal(terminal) => terminal.is_cancelled(),
            _ => false,
        }
    }

    fn is_failed(&self) -> bool {
        match &*self.inner.state.lock() {
            EngineState::Terminal(terminal) => terminal.is_failed(),
            _ => false,
        }
    }

    fn materialize_element(&self, index: isize, consumer: Box<dyn IndexedConsumer<T>>) {
        self.push_call(QueuedCall::Element(index, consumer));
    }

    fn materialize_elements(&self, consumer: Box<dyn IndexedConsumer<T>>) {
        self.push_call(QueuedCall::Elements(consumer));
    }

    fn materialize_contains(&self, value: T, consumer: Box<dyn ResultConsumer<bool>>) {
        self.push_call(QueuedCall::Contains(value, consumer));
    }

    fn materialize_size(&self, consumer: Box<dyn ResultConsumer<usize>>) {
        self.push_call(QueuedCall::Size(consumer));
    }

    fn materialize_empty(&self, consumer: Box<dyn ResultConsumer<bool>>) {
        self.push_call(QueuedCall::Empty(consumer));
    }

    fn materialize_done(&self, consumer: Box<dyn ResultConsumer<()>>) {
        self.push_call(QueuedCall::Done(consumer));
    }

    fn materialize_cancel(&self, error: FreshetError) {
        if matches!(&*self.inner.state.lock(), EngineState::Terminal(_)) {
            return;
        }
        // Downward first: the wrapped source learns about the cancellation
        // before this materializer's own terminal state exists
        if let Some(on_cancel) = self.inner.on_cancel.lock().take() {
            on_cancel(&error);
        }
        let view: Arc<dyn ListMaterializer<T>> = Arc::new(CancelledMaterializer::new(error));
        finalize(&self.inner, view);
    }
}
