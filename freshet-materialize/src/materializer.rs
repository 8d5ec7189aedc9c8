// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::consumer::{IndexedConsumer, ResultConsumer};
use freshet_core::FreshetError;

/// A lazy, cancellable, exactly-once-resolving producer of a sequence's
/// shape: its size, its elements, its emptiness.
///
/// Every `materialize_*` operation invokes its consumer exactly once per
/// logical question, asynchronously while the materializer is still
/// pending and synchronously once it reached its terminal state. Element
/// access past the realized end reports `complete`, not an error; a
/// negative index is a contract violation reported through the consumer's
/// error channel, never a panic.
pub trait ListMaterializer<T>: Send + Sync
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// `-1` until materialization completes, exact afterwards.
    fn known_size(&self) -> isize;

    /// `true` once the materializer resolved to any terminal state.
    fn is_done(&self) -> bool;

    /// `true` if the terminal state is a cancellation.
    fn is_cancelled(&self) -> bool;

    /// `true` if the terminal state is a failure.
    fn is_failed(&self) -> bool;

    /// Resolve the element at `index`.
    ///
    /// The consumer receives `accept` for an existing element, `complete`
    /// when `index` lies past the realized end, or `error`.
    fn materialize_element(&self, index: isize, consumer: Box<dyn IndexedConsumer<T>>);

    /// Walk every element in order: `accept` per element, then `complete`.
    fn materialize_elements(&self, consumer: Box<dyn IndexedConsumer<T>>);

    /// Resolve whether the sequence contains `value`.
    fn materialize_contains(&self, value: T, consumer: Box<dyn ResultConsumer<bool>>);

    /// Resolve the total size.
    fn materialize_size(&self, consumer: Box<dyn ResultConsumer<usize>>);

    /// Resolve whether the sequence is empty.
    fn materialize_empty(&self, consumer: Box<dyn ResultConsumer<bool>>);

    /// Resolve once the materializer reaches any terminal state.
    fn materialize_done(&self, consumer: Box<dyn ResultConsumer<()>>);

    /// Cancel materialization.
    ///
    /// Propagates into whatever this materializer wraps before its own
    /// terminal state becomes a cancellation view. No-op once terminal.
    fn materialize_cancel(&self, error: FreshetError);
}
