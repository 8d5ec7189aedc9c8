// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Per-instance serial task queue.
//!
//! Every [`StreamFuture`](crate::StreamFuture) confines its mutable state to
//! one logical queue: callers only *request* changes, and the queue runs the
//! requested tasks one at a time, in submission order. The [`Scheduler`]
//! trait is the boundary an external executor would plug into; the default
//! [`SerialQueue`] runs tasks trampoline-style on the submitting threads:
//! the first submitter becomes the pump and drains the queue before
//! returning, so no two tasks of one queue ever overlap.

use crate::cancellation_token::CancellationToken;
use crate::log_error;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a submitted task, usable for best-effort interruption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn fresh() -> Self {
        Self(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// A unit of work submitted to a [`Scheduler`].
///
/// The body receives the task's [`CancellationToken`]; a cooperative task
/// checks it at its checkpoints and bails out early when interrupted.
pub struct Task {
    id: TaskId,
    weight: u32,
    body: Box<dyn FnOnce(&CancellationToken) + Send + 'static>,
}

impl Task {
    /// Create a task with the default weight of 1.
    pub fn new(body: impl FnOnce(&CancellationToken) + Send + 'static) -> Self {
        Self::with_weight(1, body)
    }

    /// Create a task with an explicit cost hint.
    ///
    /// The weight is advisory; the serial queue itself runs every task the
    /// same way, but an external scheduler may use it for accounting.
    pub fn with_weight(weight: u32, body: impl FnOnce(&CancellationToken) + Send + 'static) -> Self {
        Self {
            id: TaskId::fresh(),
            weight,
            body: Box::new(body),
        }
    }

    /// The task's identity.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// The task's cost hint.
    pub const fn weight(&self) -> u32 {
        self.weight
    }
}

/// The executor contract consumed by the stream state machine.
///
/// Implementations must preserve per-queue FIFO order for `submit` and must
/// never run two tasks of the same queue concurrently. `submit_first` is the
/// control-plane fast lane: unsubscribes and terminal transitions cut ahead
/// of queued value deliveries.
pub trait Scheduler: Send + Sync {
    /// Enqueue a task at the back of the queue.
    fn submit(&self, task: Task) -> TaskId;

    /// Enqueue a task at the front of the queue.
    fn submit_first(&self, task: Task) -> TaskId;

    /// Best-effort interruption of a queued or in-flight task.
    ///
    /// Returns `true` if the task was still known to the queue and its
    /// token was tripped; the task itself decides whether to honor it.
    fn interrupt(&self, id: TaskId) -> bool;
}

struct QueueState {
    tasks: VecDeque<Task>,
    tokens: HashMap<TaskId, CancellationToken>,
    running: Option<TaskId>,
    pumping: bool,
}

/// Default [`Scheduler`]: a per-instance FIFO trampoline.
///
/// Tasks are pushed under a mutex; the submitter that finds the queue idle
/// pumps it to empty before returning, while later submitters just enqueue
/// and return. Tasks submitted from within a running task (re-entrant
/// submission during fan-out) are drained by the already-active pump, not
/// run recursively.
///
/// A panicking task is caught and logged; the pump continues with the next
/// task.
#[derive(Clone)]
pub struct SerialQueue {
    state: Arc<Mutex<QueueState>>,
}

impl SerialQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                tasks: VecDeque::new(),
                tokens: HashMap::new(),
                running: None,
                pumping: false,
            })),
        }
    }

    /// The id of the task currently executing, if any.
    #[must_use]
    pub fn running_task(&self) -> Option<TaskId> {
        self.state.lock().running
    }

    /// Number of tasks waiting behind the running one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.state.lock().tasks.len()
    }

    fn enqueue(&self, task: Task, first: bool) -> TaskId {
        let id = task.id();
        let should_pump = {
            let mut state = self.state.lock();
            state.tokens.insert(id, CancellationToken::new());
            if first {
                state.tasks.push_front(task);
            } else {
                state.tasks.push_back(task);
            }
            if state.pumping {
                false
            } else {
                state.pumping = true;
                true
            }
        };

        if should_pump {
            self.pump();
        }
        id
    }

    fn pump(&self) {
        loop {
            let task = {
                let mut state = self.state.lock();
                match state.tasks.pop_front() {
                    Some(task) => {
                        state.running = Some(task.id());
                        Some(task)
                    }
                    None => {
                        state.running = None;
                        state.pumping = false;
                        None
                    }
                }
            };

            let Some(task) = task else { break };
            let id = task.id();
            let token = self
                .state
                .lock()
                .tokens
                .get(&id)
                .cloned()
                .unwrap_or_default();

            let body = task.body;
            if catch_unwind(AssertUnwindSafe(move || body(&token))).is_err() {
                log_error!("serial queue: {id} panicked; continuing with next task");
            }

            let mut state = self.state.lock();
            state.tokens.remove(&id);
            state.running = None;
        }
    }
}

impl Default for SerialQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for SerialQueue {
    fn submit(&self, task: Task) -> TaskId {
        self.enqueue(task, false)
    }

    fn submit_first(&self, task: Task) -> TaskId {
        self.enqueue(task, true)
    }

    fn interrupt(&self, id: TaskId) -> bool {
        let token = self.state.lock().tokens.get(&id).cloned();
        match token {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
