// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Blocking pull cursor over a [`StreamFuture`](crate::StreamFuture).
//!
//! An iterator first replays whatever the stream's retention policy
//! recommends, then receives live values as they are set. `has_next`
//! returns `false` after a normal close and re-raises the terminal failure
//! after a cancellation or error. The timed variant carries a shrinking
//! overall budget across repeated calls.

use crate::error::{FreshetError, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub(crate) enum IterTerminal {
    Closed,
    Failed(FreshetError),
}

pub(crate) struct IterState<T> {
    queue: VecDeque<T>,
    terminal: Option<IterTerminal>,
}

/// Shared half of an iterator: the writer pushes into it, the cursor pulls.
pub(crate) struct IterShared<T> {
    state: Mutex<IterState<T>>,
    available: Condvar,
}

impl<T> IterShared<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(IterState {
                queue: VecDeque::new(),
                terminal: None,
            }),
            available: Condvar::new(),
        }
    }

    pub(crate) fn push(&self, value: T) {
        let mut state = self.state.lock();
        if state.terminal.is_some() {
            return;
        }
        state.queue.push_back(value);
        self.available.notify_all();
    }

    pub(crate) fn push_many(&self, values: Vec<T>) {
        let mut state = self.state.lock();
        if state.terminal.is_some() {
            return;
        }
        state.queue.extend(values);
        self.available.notify_all();
    }

    /// Record the terminal outcome. First call sticks.
    pub(crate) fn terminate(&self, terminal: IterTerminal) {
        let mut state = self.state.lock();
        if state.terminal.is_none() {
            state.terminal = Some(terminal);
        }
        self.available.notify_all();
    }
}

/// Blocking pull-style cursor returned by
/// [`StreamFuture::iter`](crate::StreamFuture::iter).
///
/// Not a `std::iter::Iterator`: `has_next`/`next` block and can fail with
/// timeout or the stream's terminal error, which the std trait cannot
/// express without swallowing the distinction.
pub struct FutureIter<T> {
    shared: Arc<IterShared<T>>,
    /// Remaining overall budget for the timed variant.
    budget: Option<Duration>,
}

impl<T> FutureIter<T> {
    pub(crate) fn new(shared: Arc<IterShared<T>>, budget: Option<Duration>) -> Self {
        Self { shared, budget }
    }

    /// Block until a value or the end of the stream is known.
    ///
    /// # Errors
    ///
    /// Returns the stream's terminal failure if it failed, `Cancelled` if it
    /// was cancelled, or `Timeout` if this cursor's overall budget ran out.
    pub fn has_next(&mut self) -> Result<bool> {
        self.wait_ready(None)
    }

    /// Like [`has_next`](Self::has_next) with a per-call deadline.
    ///
    /// The overall budget, when present, still applies: the effective
    /// deadline is the smaller of the two.
    pub fn has_next_for(&mut self, timeout: Duration) -> Result<bool> {
        self.wait_ready(Some(timeout))
    }

    /// Block for the next value.
    ///
    /// # Errors
    ///
    /// `NoElement` on exhaustion, plus everything
    /// [`has_next`](Self::has_next) can raise.
    pub fn next(&mut self) -> Result<T> {
        if self.wait_ready(None)? {
            self.pop()
        } else {
            Err(FreshetError::NoElement)
        }
    }

    /// Like [`next`](Self::next) with a per-call deadline.
    pub fn next_for(&mut self, timeout: Duration) -> Result<T> {
        if self.wait_ready(Some(timeout))? {
            self.pop()
        } else {
            Err(FreshetError::NoElement)
        }
    }

    /// The overall budget remaining on a timed cursor, if any.
    #[must_use]
    pub fn remaining_budget(&self) -> Option<Duration> {
        self.budget
    }

    fn pop(&mut self) -> Result<T> {
        self.shared
            .state
            .lock()
            .queue
            .pop_front()
            .ok_or(FreshetError::NoElement)
    }

    fn wait_ready(&mut self, timeout: Option<Duration>) -> Result<bool> {
        let shared = Arc::clone(&self.shared);
        let started = Instant::now();

        let effective = match (timeout, self.budget) {
            (Some(call), Some(budget)) => Some(call.min(budget)),
            (Some(call), None) => Some(call),
            (None, Some(budget)) => Some(budget),
            (None, None) => None,
        };
        let deadline = effective.map(|d| started + d);

        let mut state = shared.state.lock();
        let outcome = loop {
            if !state.queue.is_empty() {
                break Ok(true);
            }
            if let Some(terminal) = &state.terminal {
                break match terminal {
                    IterTerminal::Closed => Ok(false),
                    IterTerminal::Failed(e) => Err(e.clone()),
                };
            }

            match deadline {
                None => self.shared.available.wait(&mut state),
                Some(deadline) => {
                    if self
                        .shared
                        .available
                        .wait_until(&mut state, deadline)
                        .timed_out()
                    {
                        // A push may have raced the wakeup
                        if !state.queue.is_empty() {
                            break Ok(true);
                        }
                        break match &state.terminal {
                            Some(IterTerminal::Closed) => Ok(false),
                            Some(IterTerminal::Failed(e)) => Err(e.clone()),
                            None => Err(FreshetError::timeout(format!(
                                "iterator budget of {effective:?} elapsed"
                            ))),
                        };
                    }
                }
            }
        };
        drop(state);

        if let Some(budget) = self.budget {
            self.budget = Some(budget.saturating_sub(started.elapsed()));
        }
        outcome
    }
}
