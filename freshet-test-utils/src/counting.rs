// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::FreshetError;
use freshet_materialize::{
    IndexedConsumer, ListMaterializer, MaterializedList, ResultConsumer,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Delegating materializer that counts how often it is actually pulled.
///
/// Laziness and short-circuit tests wrap their source in one of these and
/// assert on the counters.
pub struct CountingSource<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    inner: Arc<dyn ListMaterializer<T>>,
    element_pulls: AtomicUsize,
    walks: AtomicUsize,
    empty_probes: AtomicUsize,
}

impl<T> CountingSource<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn wrap(inner: Arc<dyn ListMaterializer<T>>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            element_pulls: AtomicUsize::new(0),
            walks: AtomicUsize::new(0),
            empty_probes: AtomicUsize::new(0),
        })
    }

    /// Counting view over an already materialized list.
    pub fn over_list(elements: Vec<T>) -> Arc<Self> {
        Self::wrap(Arc::new(MaterializedList::new(elements)))
    }

    /// Number of `materialize_element` calls that reached the source.
    pub fn element_pulls(&self) -> usize {
        self.element_pulls.load(Ordering::Acquire)
    }

    /// Number of full `materialize_elements` walks.
    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::Acquire)
    }

    /// Number of `materialize_empty` probes.
    pub fn empty_probes(&self) -> usize {
        self.empty_probes.load(Ordering::Acquire)
    }
}

impl<T> ListMaterializer<T> for CountingSource<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn known_size(&self) -> isize {
        self.inner.known_size()
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    fn is_failed(&self) -> bool {
        self.inner.is_failed()
    }

    fn materialize_element(&self, index: isize, consumer: Box<dyn IndexedConsumer<T>>) {
        self.element_pulls.fetch_add(1, Ordering::AcqRel);
        self.inner.materialize_element(index, consumer);
    }

    fn materialize_elements(&self, consumer: Box<dyn IndexedConsumer<T>>) {
        self.walks.fetch_add(1, Ordering::AcqRel);
        self.inner.materialize_elements(consumer);
    }

    fn materialize_contains(&self, value: T, consumer: Box<dyn ResultConsumer<bool>>) {
        self.inner.materialize_contains(value, consumer);
    }

    fn materialize_size(&self, consumer: Box<dyn ResultConsumer<usize>>) {
        self.inner.materialize_size(consumer);
    }

    fn materialize_empty(&self, consumer: Box<dyn ResultConsumer<bool>>) {
        self.empty_probes.fetch_add(1, Ordering::AcqRel);
        self.inner.materialize_empty(consumer);
    }

    fn materialize_done(&self, consumer: Box<dyn ResultConsumer<()>>) {
        self.inner.materialize_done(consumer);
    }

    fn materialize_cancel(&self, error: FreshetError) {
        self.inner.materialize_cancel(error);
    }
}
