// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Replay history policies for the stream state machine.
//!
//! A retention policy decides which past values a late subscriber receives
//! on attachment, and evicts according to count, age, or both. Policies are
//! pure data structures: they are only ever invoked from within the
//! stream's serialized writer slot and carry no synchronization of their
//! own.
//!
//! # Variants
//!
//! - [`KeepAll`]: unbounded retention
//! - [`KeepNone`]: no retention (hot-subject behavior)
//! - [`KeepLast`]: bounded by count
//! - [`KeepWithin`]: bounded by age
//! - [`KeepLastWithin`]: bounded by count *or* age, whichever evicts first
//! - [`UntilFirstReplay`]: an initial policy that permanently swaps to a
//!   terminal one the first time a subscriber replays
//!
//! # Configuration
//!
//! [`RetentionConfig`] is the property-file-shaped surface: an outer layer
//! deserializes it and hands it to [`StreamFuture`](crate::StreamFuture)
//! construction; the core only ever sees the resulting policy.

mod bounded;
mod simple;
mod until_first_replay;

pub use bounded::{KeepLast, KeepLastWithin, KeepWithin};
pub use simple::{KeepAll, KeepNone};
pub use until_first_replay::UntilFirstReplay;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pluggable replay/eviction strategy.
///
/// The eviction predicate is re-applied after every insertion, so the
/// buffer never exceeds its configured bound at rest.
pub trait RetentionPolicy<T: Clone>: Send {
    /// Record one value.
    fn record(&mut self, value: T);

    /// Record a batch of values, in order.
    fn record_bulk(&mut self, values: Vec<T>) {
        for value in values {
            self.record(value);
        }
    }

    /// Forget everything retained so far.
    fn clear(&mut self);

    /// The stream terminated; flush or retain final state per policy.
    fn close(&mut self) {}

    /// What a newly attached subscriber should replay, oldest first.
    ///
    /// Takes `&mut self` because some policies (notably
    /// [`UntilFirstReplay`]) change state on the first replay.
    fn replay(&mut self) -> Vec<T>;
}

/// Property-driven retention policy parameters.
///
/// Absent bounds mean unbounded: the default config maps to [`KeepAll`].
///
/// # Example
///
/// ```
/// use freshet_core::retention::RetentionConfig;
///
/// let config: RetentionConfig =
///     serde_json::from_str(r#"{ "max_count": 16, "max_age_ms": 5000 }"#).unwrap();
/// let _policy = config.into_policy::<String>();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Maximum number of retained values.
    pub max_count: Option<usize>,
    /// Maximum age of retained values, in milliseconds.
    pub max_age_ms: Option<u64>,
    /// Swap to no retention after the first subscriber replays.
    pub drop_after_first_replay: bool,
}

impl RetentionConfig {
    /// Build the policy this configuration describes.
    #[must_use]
    pub fn into_policy<T: Clone + Send + 'static>(self) -> Box<dyn RetentionPolicy<T>> {
        let base: Box<dyn RetentionPolicy<T>> = match (self.max_count, self.max_age_ms) {
            (Some(count), Some(ms)) => {
                Box::new(KeepLastWithin::new(count, Duration::from_millis(ms)))
            }
            (Some(count), None) => Box::new(KeepLast::new(count)),
            (None, Some(ms)) => Box::new(KeepWithin::new(Duration::from_millis(ms))),
            (None, None) => Box::new(KeepAll::new()),
        };

        if self.drop_after_first_replay {
            Box::new(UntilFirstReplay::new(base, Box::new(KeepNone)))
        } else {
            base
        }
    }
}
