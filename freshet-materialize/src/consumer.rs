// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The callback protocols between a materializer and its callers.
//!
//! [`IndexedConsumer`] is the element-by-element contract: for a given
//! logical pull, exactly one of "zero or more `accept` calls followed by
//! one `complete`" or "a single `error`" occurs. [`ResultConsumer`] is the
//! single-shot contract used by the scalar operations (`size`, `is_empty`,
//! `contains`, `done`).
//!
//! A consumer that fails while being notified has the failure routed back
//! to its own `error`/`failed` channel by the producer; it never reaches
//! the producer or other consumers.

use freshet_core::{FreshetError, Result};

/// Element-by-element callback contract.
pub trait IndexedConsumer<T>: Send {
    /// An element is available. `size` is `-1` while the total is unknown.
    fn accept(&mut self, size: isize, index: usize, element: &T) -> Result<()>;

    /// The sequence ended with no more elements; the final size is known.
    fn complete(&mut self, size: usize) -> Result<()>;

    /// Terminal failure at (or after) the given index, when known.
    fn error(&mut self, index: Option<usize>, error: &FreshetError);
}

/// Single-shot callback contract for scalar answers.
pub trait ResultConsumer<R>: Send {
    /// The answer is available.
    fn resolved(&mut self, value: R);

    /// The question terminated with a failure or cancellation.
    fn failed(&mut self, error: FreshetError);
}

/// [`IndexedConsumer`] built from three closures.
pub struct FnIndexedConsumer<T, A, C, E>
where
    A: FnMut(isize, usize, &T) -> Result<()> + Send,
    C: FnMut(usize) -> Result<()> + Send,
    E: FnMut(Option<usize>, &FreshetError) + Send,
{
    on_accept: A,
    on_complete: C,
    on_error: E,
    _marker: std::marker::PhantomData<fn(&T)>,
}

impl<T, A, C, E> FnIndexedConsumer<T, A, C, E>
where
    A: FnMut(isize, usize, &T) -> Result<()> + Send,
    C: FnMut(usize) -> Result<()> + Send,
    E: FnMut(Option<usize>, &FreshetError) + Send,
{
    pub fn new(on_accept: A, on_complete: C, on_error: E) -> Self {
        Self {
            on_accept,
            on_complete,
            on_error,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, A, C, E> IndexedConsumer<T> for FnIndexedConsumer<T, A, C, E>
where
    T: Send,
    A: FnMut(isize, usize, &T) -> Result<()> + Send,
    C: FnMut(usize) -> Result<()> + Send,
    E: FnMut(Option<usize>, &FreshetError) + Send,
{
    fn accept(&mut self, size: isize, index: usize, element: &T) -> Result<()> {
        (self.on_accept)(size, index, element)
    }

    fn complete(&mut self, size: usize) -> Result<()> {
        (self.on_complete)(size)
    }

    fn error(&mut self, index: Option<usize>, error: &FreshetError) {
        (self.on_error)(index, error);
    }
}

/// [`ResultConsumer`] built from two closures.
pub struct FnResultConsumer<R, V, F>
where
    V: FnMut(R) + Send,
    F: FnMut(FreshetError) + Send,
{
    on_resolved: V,
    on_failed: F,
    _marker: std::marker::PhantomData<fn(R)>,
}

impl<R, V, F> FnResultConsumer<R, V, F>
where
    V: FnMut(R) + Send,
    F: FnMut(FreshetError) + Send,
{
    pub fn new(on_resolved: V, on_failed: F) -> Self {
        Self {
            on_resolved,
            on_failed,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<R, V, F> ResultConsumer<R> for FnResultConsumer<R, V, F>
where
    R: Send,
    V: FnMut(R) + Send,
    F: FnMut(FreshetError) + Send,
{
    fn resolved(&mut self, value: R) {
        (self.on_resolved)(value);
    }

    fn failed(&mut self, error: FreshetError) {
        (self.on_failed)(error);
    }
}
