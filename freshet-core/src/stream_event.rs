// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::FreshetError;

/// An event observed on a stream subscription.
///
/// This enum is the tagged representation of the push contract: a live
/// value, normal completion, or terminal failure. Exactly one of `Closed`
/// or `Failed` ends any subscription, and nothing follows it.
#[derive(Debug, Clone)]
pub enum StreamEvent<T> {
    /// A live value delivered in emission order.
    Value(T),
    /// The stream completed normally.
    Closed,
    /// The stream terminated with a failure (or cancellation).
    Failed(FreshetError),
}

impl<T: PartialEq> PartialEq for StreamEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StreamEvent::Value(a), StreamEvent::Value(b)) => a == b,
            (StreamEvent::Closed, StreamEvent::Closed) => true,
            // Failures are never equal
            _ => false,
        }
    }
}

impl<T> StreamEvent<T> {
    /// Returns `true` if this is a `Value`.
    pub const fn is_value(&self) -> bool {
        matches!(self, StreamEvent::Value(_))
    }

    /// Returns `true` if this event terminates the subscription.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Closed | StreamEvent::Failed(_))
    }

    /// Converts into `Option<T>`, discarding terminal events.
    pub fn ok(self) -> Option<T> {
        match self {
            StreamEvent::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Converts into `Option<FreshetError>`, discarding values and closes.
    pub fn err(self) -> Option<FreshetError> {
        match self {
            StreamEvent::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Maps a `StreamEvent<T>` to `StreamEvent<U>` over the contained value.
    ///
    /// Terminal events are propagated unchanged.
    pub fn map<U, F>(self, f: F) -> StreamEvent<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            StreamEvent::Value(v) => StreamEvent::Value(f(v)),
            StreamEvent::Closed => StreamEvent::Closed,
            StreamEvent::Failed(e) => StreamEvent::Failed(e),
        }
    }

    /// Returns the contained value, panicking on terminal events.
    ///
    /// # Panics
    ///
    /// Panics if the event is `Closed` or `Failed`.
    pub fn unwrap(self) -> T {
        match self {
            StreamEvent::Value(v) => v,
            StreamEvent::Closed => panic!("called `StreamEvent::unwrap()` on `Closed`"),
            StreamEvent::Failed(e) => {
                panic!("called `StreamEvent::unwrap()` on a `Failed` value: {e:?}")
            }
        }
    }
}
