// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::RetentionPolicy;

/// Unbounded retention: a late subscriber replays every value ever set.
#[derive(Debug, Clone, Default)]
pub struct KeepAll<T> {
    buffer: Vec<T>,
}

impl<T> KeepAll<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }
}

impl<T: Clone + Send> RetentionPolicy<T> for KeepAll<T> {
    fn record(&mut self, value: T) {
        self.buffer.push(value);
    }

    fn record_bulk(&mut self, mut values: Vec<T>) {
        self.buffer.append(&mut values);
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn replay(&mut self) -> Vec<T> {
        self.buffer.clone()
    }
}

/// No retention: late subscribers replay nothing (hot-subject behavior).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepNone;

impl<T: Clone + Send> RetentionPolicy<T> for KeepNone {
    fn record(&mut self, _value: T) {}

    fn record_bulk(&mut self, _values: Vec<T>) {}

    fn clear(&mut self) {}

    fn replay(&mut self) -> Vec<T> {
        Vec::new()
    }
}
