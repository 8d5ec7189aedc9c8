// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::RetentionPolicy;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Retention bounded by count: keeps at most the last `count` values.
#[derive(Debug, Clone)]
pub struct KeepLast<T> {
    count: usize,
    buffer: VecDeque<T>,
}

impl<T> KeepLast<T> {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count,
            buffer: VecDeque::with_capacity(count),
        }
    }
}

impl<T: Clone + Send> RetentionPolicy<T> for KeepLast<T> {
    fn record(&mut self, value: T) {
        self.buffer.push_back(value);
        while self.buffer.len() > self.count {
            self.buffer.pop_front();
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn replay(&mut self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }
}

/// Retention bounded by age: keeps values recorded within `max_age`.
///
/// Eviction runs on every record and again at replay, so a subscriber never
/// sees a value older than the bound even if nothing was recorded since.
#[derive(Debug, Clone)]
pub struct KeepWithin<T> {
    max_age: Duration,
    buffer: VecDeque<(Instant, T)>,
}

impl<T> KeepWithin<T> {
    #[must_use]
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            buffer: VecDeque::new(),
        }
    }

    fn evict_expired(&mut self) {
        let now = Instant::now();
        while let Some((recorded_at, _)) = self.buffer.front() {
            if now.duration_since(*recorded_at) > self.max_age {
                self.buffer.pop_front();
            } else {
                break;
            }
        }
    }
}

impl<T: Clone + Send> RetentionPolicy<T> for KeepWithin<T> {
    fn record(&mut self, value: T) {
        self.buffer.push_back((Instant::now(), value));
        self.evict_expired();
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn replay(&mut self) -> Vec<T> {
        self.evict_expired();
        self.buffer.iter().map(|(_, v)| v.clone()).collect()
    }
}

/// Retention bounded by count or age: either bound evicts.
#[derive(Debug, Clone)]
pub struct KeepLastWithin<T> {
    count: usize,
    max_age: Duration,
    buffer: VecDeque<(Instant, T)>,
}

impl<T> KeepLastWithin<T> {
    #[must_use]
    pub fn new(count: usize, max_age: Duration) -> Self {
        Self {
            count,
            max_age,
            buffer: VecDeque::with_capacity(count),
        }
    }

    fn evict(&mut self) {
        while self.buffer.len() > self.count {
            self.buffer.pop_front();
        }
        let now = Instant::now();
        while let Some((recorded_at, _)) = self.buffer.front() {
            if now.duration_since(*recorded_at) > self.max_age {
                self.buffer.pop_front();
            } else {
                break;
            }
        }
    }
}

impl<T: Clone + Send> RetentionPolicy<T> for KeepLastWithin<T> {
    fn record(&mut self, value: T) {
        self.buffer.push_back((Instant::now(), value));
        self.evict();
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn replay(&mut self) -> Vec<T> {
        self.evict();
        self.buffer.iter().map(|(_, v)| v.clone()).collect()
    }
}
