// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cancellation token shared between a task and whoever may interrupt it.
//!
//! Tokens are handed to every task submitted to a [`SerialQueue`] and
//! tripped by [`Scheduler::interrupt`]; a cooperative task polls
//! [`CancellationToken::is_cancelled`] at its checkpoints.
//!
//! [`SerialQueue`]: crate::scheduler::SerialQueue
//! [`Scheduler::interrupt`]: crate::scheduler::Scheduler::interrupt

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};
use event_listener::{Event, EventListener, Listener};
use std::sync::Arc;
use std::time::Duration;

/// Clonable cancellation flag.
///
/// All clones share the same state. When `cancel()` is called on any clone,
/// every waiter, blocking or async, is woken.
///
/// # Example
///
/// ```
/// use freshet_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    event: Event,
}

impl CancellationToken {
    /// Create a new token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                event: Event::new(),
            }),
        }
    }

    /// Cancel the token, waking all waiters. Idempotent.
    pub fn cancel(&self) {
        // Release so all writes preceding the cancel are visible to waiters
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.event.notify(usize::MAX);
    }

    /// Check if the token has been cancelled (non-blocking).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Block the calling thread until the token is cancelled.
    pub fn wait(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let listener = self.inner.event.listen();
            // Re-check after registering to close the listen/cancel race
            if self.is_cancelled() {
                return;
            }
            listener.wait();
        }
    }

    /// Block until cancelled or the timeout elapses.
    ///
    /// Returns `true` if the token was cancelled, `false` on timeout.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if self.is_cancelled() {
                return true;
            }
            let listener = self.inner.event.listen();
            if self.is_cancelled() {
                return true;
            }
            if listener.wait_deadline(deadline).is_none() {
                return self.is_cancelled();
            }
        }
    }

    /// Wait asynchronously until the token is cancelled.
    ///
    /// Resolves immediately if the token is already cancelled.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            listener: None,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`CancellationToken::cancelled()`].
pub struct Cancelled<'a> {
    token: &'a CancellationToken,
    listener: Option<EventListener>,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.token.is_cancelled() {
            return Poll::Ready(());
        }

        if self.listener.is_none() {
            self.listener = Some(self.token.inner.event.listen());

            // cancel() may have raced the listen() above
            if self.token.is_cancelled() {
                return Poll::Ready(());
            }
        }

        match Pin::new(self.listener.as_mut().expect("listener registered")).poll(cx) {
            Poll::Ready(()) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}
