// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal materializer views.
//!
//! Once a materializer resolves, one of these concrete views answers all
//! further calls synchronously from cached, referentially stable data.

use crate::consumer::{IndexedConsumer, ResultConsumer};
use crate::logging::log_warn;
use crate::materializer::ListMaterializer;
use freshet_core::FreshetError;
use std::sync::Arc;

/// A fully realized in-memory list view.
pub struct MaterializedList<T> {
    elements: Arc<Vec<T>>,
}

impl<T> MaterializedList<T> {
    #[must_use]
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            elements: Arc::new(elements),
        }
    }

    /// The realized empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Shared access to the realized elements.
    #[must_use]
    pub fn elements(&self) -> &Arc<Vec<T>> {
        &self.elements
    }
}

/// Route a consumer's own failure back to its error channel.
fn report<T>(consumer: &mut dyn IndexedConsumer<T>, index: Option<usize>, error: &FreshetError) {
    log_warn!("consumer raised while being notified: {error}");
    consumer.error(index, error);
}

impl<T> ListMaterializer<T> for MaterializedList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn known_size(&self) -> isize {
        self.elements.len() as isize
    }

    fn is_done(&self) -> bool {
        true
    }

    fn is_cancelled(&self) -> bool {
        false
    }

    fn is_failed(&self) -> bool {
        false
    }

    fn materialize_element(&self, index: isize, mut consumer: Box<dyn IndexedConsumer<T>>) {
        if index < 0 {
            consumer.error(None, &FreshetError::InvalidIndex { index });
            return;
        }
        let size = self.elements.len();
        let at = index as usize;
        let outcome = match self.elements.get(at) {
            Some(element) => consumer.accept(size as isize, at, element),
            // Past the realized end is completion, not an error
            None => consumer.complete(size),
        };
        if let Err(error) = outcome {
            report(consumer.as_mut(), Some(at), &error);
        }
    }

    fn materialize_elements(&self, mut consumer: Box<dyn IndexedConsumer<T>>) {
        let size = self.elements.len() as isize;
        for (index, element) in self.elements.iter().enumerate() {
            if let Err(error) = consumer.accept(size, index, element) {
                report(consumer.as_mut(), Some(index), &error);
                return;
            }
        }
        if let Err(error) = consumer.complete(self.elements.len()) {
            report(consumer.as_mut(), None, &error);
        }
    }

    fn materialize_contains(&self, value: T, mut consumer: Box<dyn ResultConsumer<bool>>) {
        consumer.resolved(self.elements.contains(&value));
    }

    fn materialize_size(&self, mut consumer: Box<dyn ResultConsumer<usize>>) {
        consumer.resolved(self.elements.len());
    }

    fn materialize_empty(&self, mut consumer: Box<dyn ResultConsumer<bool>>) {
        consumer.resolved(self.elements.is_empty());
    }

    fn materialize_done(&self, mut consumer: Box<dyn ResultConsumer<()>>) {
        consumer.resolved(());
    }

    fn materialize_cancel(&self, _error: FreshetError) {}
}

/// Terminal view of a failed materializer: every call reports the cause.
pub struct FailedMaterializer {
    error: FreshetError,
}

impl FailedMaterializer {
    #[must_use]
    pub fn new(error: FreshetError) -> Self {
        Self { error }
    }
}

impl<T> ListMaterializer<T> for FailedMaterializer
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn known_size(&self) -> isize {
        -1
    }

    fn is_done(&self) -> bool {
        true
    }

    fn is_cancelled(&self) -> bool {
        false
    }

    fn is_failed(&self) -> bool {
        true
    }

    fn materialize_element(&self, _index: isize, mut consumer: Box<dyn IndexedConsumer<T>>) {
        consumer.error(None, &self.error);
    }

    fn materialize_elements(&self, mut consumer: Box<dyn IndexedConsumer<T>>) {
        consumer.error(None, &self.error);
    }

    fn materialize_contains(&self, _value: T, mut consumer: Box<dyn ResultConsumer<bool>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_size(&self, mut consumer: Box<dyn ResultConsumer<usize>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_empty(&self, mut consumer: Box<dyn ResultConsumer<bool>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_done(&self, mut consumer: Box<dyn ResultConsumer<()>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_cancel(&self, _error: FreshetError) {}
}

/// Terminal view of a cancelled materializer.
///
/// Distinct from [`FailedMaterializer`] so callers can tell "I asked you
/// to stop" apart from "something broke".
pub struct CancelledMaterializer {
    error: FreshetError,
}

impl CancelledMaterializer {
    #[must_use]
    pub fn new(error: FreshetError) -> Self {
        Self { error }
    }
}

impl Default for CancelledMaterializer {
    fn default() -> Self {
        Self::new(FreshetError::Cancelled)
    }
}

impl<T> ListMaterializer<T> for CancelledMaterializer
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn known_size(&self) -> isize {
        -1
    }

    fn is_done(&self) -> bool {
        true
    }

    fn is_cancelled(&self) -> bool {
        true
    }

    fn is_failed(&self) -> bool {
        false
    }

    fn materialize_element(&self, _index: isize, mut consumer: Box<dyn IndexedConsumer<T>>) {
        consumer.error(None, &self.error);
    }

    fn materialize_elements(&self, mut consumer: Box<dyn IndexedConsumer<T>>) {
        consumer.error(None, &self.error);
    }

    fn materialize_contains(&self, _value: T, mut consumer: Box<dyn ResultConsumer<bool>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_size(&self, mut consumer: Box<dyn ResultConsumer<usize>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_empty(&self, mut consumer: Box<dyn ResultConsumer<bool>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_done(&self, mut consumer: Box<dyn ResultConsumer<()>>) {
        consumer.failed(self.error.clone());
    }

    fn materialize_cancel(&self, _error: FreshetError) {}
}
